//! Interactive read-eval-print loop around an [`Assistant`].

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;

use crate::assistant::Assistant;

pub const WELCOME: &str = "🤖 智能待办事项助手

我可以帮助您管理日常任务！

可用功能：
• 创建新任务 - \"创建一个任务：学习Python\"
• 查看所有任务 - \"显示我的所有任务\"
• 查看未完成任务 - \"显示未完成的任务\"
• 更新任务 - \"修改任务1的标题为'完成项目'\"
• 删除任务 - \"删除任务2\"
• 搜索任务 - \"搜索包含'学习'的任务\"
• 标记完成 - \"标记任务3为已完成\"

输入 'quit' 或 'exit' 退出程序
";

pub const FAREWELL: &str = "👋 再见！感谢使用待办事项助手！";

const PROMPT: &str = "您: ";

pub fn is_exit_command(line: &str) -> bool {
    matches!(
        line.trim().to_lowercase().as_str(),
        "quit" | "exit" | "退出" | "q"
    )
}

/// Run turns until an exit word, end of input, or `shutdown` flips to true.
///
/// A failed turn is reported and the loop carries on.
pub async fn run<R, W>(
    assistant: &Assistant,
    input: R,
    mut output: W,
    mut shutdown: watch::Receiver<bool>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    output.write_all(WELCOME.as_bytes()).await?;

    loop {
        if *shutdown.borrow() {
            break;
        }

        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown.changed() => break,
        };
        let Some(line) = line else {
            break;
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if is_exit_command(line) {
            break;
        }

        let reply = tokio::select! {
            reply = assistant.respond(line) => reply,
            _ = shutdown.changed() => break,
        };
        output
            .write_all(format!("\n助手:\n{}\n\n", reply).as_bytes())
            .await?;
    }

    output.write_all(format!("\n{}\n", FAREWELL).as_bytes()).await?;
    output.flush().await?;
    tracing::debug!("shell stopped");
    Ok(())
}
