use std::sync::Arc;

use todo_assistant::assistant::Assistant;
use todo_assistant::db::Database;
use todo_assistant::llm::{AzureChatClient, ChatConfig};
use todo_assistant::shell::{self, FAREWELL, WELCOME};
use tokio::sync::watch;

fn setup() -> (Assistant, Database) {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let chat = AzureChatClient::new(ChatConfig::default()).expect("Failed to build chat client");
    (Assistant::new(Arc::new(db.clone()), Arc::new(chat)), db)
}

async fn run_shell(assistant: &Assistant, input: &str, shutdown: watch::Receiver<bool>) -> String {
    let mut output = Vec::new();
    shell::run(assistant, input.as_bytes(), &mut output, shutdown)
        .await
        .expect("Shell failed");
    String::from_utf8(output).expect("Output is not UTF-8")
}

#[tokio::test]
async fn stops_at_the_first_exit_word() {
    let (assistant, db) = setup();
    let (_tx, rx) = watch::channel(false);

    let output = run_shell(
        &assistant,
        "创建一个任务：买菜\n\n   \nQuit\n创建一个任务：不会执行\n",
        rx,
    )
    .await;

    assert!(output.starts_with(WELCOME));
    assert!(output.trim_end().ends_with(FAREWELL));
    assert!(output.contains("待办事项创建成功"));
    let titles: Vec<String> = db
        .get_todos(None)
        .unwrap()
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["买菜"]);
}

#[tokio::test]
async fn a_failed_turn_does_not_end_the_loop() {
    let (assistant, db) = setup();
    let (_tx, rx) = watch::channel(false);

    // The first line needs the model, which is not configured.
    let output = run_shell(&assistant, "今天天气怎么样\n创建一个任务：读书\n", rx).await;

    assert!(output.contains("处理请求时出错"));
    assert_eq!(db.get_todos(None).unwrap().len(), 1);
}

#[tokio::test]
async fn shutdown_signal_ends_the_loop_before_reading() {
    let (assistant, db) = setup();
    let (tx, rx) = watch::channel(false);
    tx.send(true).expect("Receiver dropped");

    let output = run_shell(&assistant, "创建一个任务：不会执行\n", rx).await;

    assert!(output.contains(FAREWELL));
    assert!(db.get_todos(None).unwrap().is_empty());
}
