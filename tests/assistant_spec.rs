use serde_json::json;
use speculate2::speculate;
use todo_assistant::assistant::*;

speculate! {
    before {
        let classifier = IntentClassifier::new();
        let extractor = ParameterExtractor::new();
    }

    describe "classification" {
        it "lets a pattern win over a stronger keyword score" {
            // "完成" is a mark_completed keyword, but "需要.*完成" is a create pattern.
            let intent = classifier.classify_detailed("需要完成季度报告").expect("classified");
            assert_eq!(intent.operation, Operation::CreateTodo);
            assert_eq!(intent.source, ConfidenceSource::PatternMatch);
        }

        it "tries patterns in declaration order" {
            // "已完成.*" (get_todos) is declared before "标记.*完成" (mark_completed).
            assert_eq!(classifier.classify("标记任务1为已完成"), Some(Operation::GetTodos));
            assert_eq!(classifier.classify("显示我的所有任务"), Some(Operation::GetTodos));
            assert_eq!(classifier.classify("删除任务3"), Some(Operation::DeleteTodo));
        }

        it "falls back to keywords when no pattern matches" {
            let intent = classifier.classify_detailed("删掉编号7").expect("classified");
            assert_eq!(intent.operation, Operation::DeleteTodo);
            assert_eq!(intent.source, ConfidenceSource::KeywordScore);

            assert_eq!(classifier.classify("帮我找一下报告"), Some(Operation::SearchTodos));
        }

        it "matches keywords case-insensitively" {
            assert_eq!(classifier.classify("DONE"), Some(Operation::MarkCompleted));
        }

        it "breaks keyword ties by catalog order, every time" {
            let text = "找一下关于项目的任务";
            let first = classifier.classify(text);
            assert_eq!(first, Some(Operation::CreateTodo));
            for _ in 0..5 {
                assert_eq!(classifier.classify(text), first);
                assert_eq!(IntentClassifier::new().classify(text), first);
            }
        }

        it "leaves unrelated text unresolved" {
            assert_eq!(classifier.classify("今天天气怎么样"), None);
            assert_eq!(classifier.classify(""), None);
        }
    }

    describe "extraction" {
        it "takes the create title after a colon" {
            let args = extractor.extract("创建一个任务：学习Python编程", Operation::CreateTodo);
            assert_eq!(args.to_value(), json!({"title": "学习Python编程"}));
        }

        it "reads the completion filter" {
            let args = extractor.extract("显示未完成的任务", Operation::GetTodos);
            assert_eq!(args.to_value(), json!({"completed": false}));
        }

        it "reads the id for mark_completed" {
            let args = extractor.extract("标记任务1为已完成", Operation::MarkCompleted);
            assert_eq!(args.to_value(), json!({"id": 1}));
        }

        it "is a pure function of its inputs" {
            let inputs = [
                ("创建一个任务：学习Python编程 2025-06-26", Operation::CreateTodo),
                ("搜索包含'学习'的任务", Operation::SearchTodos),
                ("修改任务1的标题为'完成项目'", Operation::UpdateTodo),
            ];
            for (text, op) in inputs {
                assert_eq!(extractor.extract(text, op), extractor.extract(text, op));
            }
        }
    }

    describe "validation" {
        it "reports a missing id for update" {
            let args = ArgumentSet::new().with("title", "x");
            assert_eq!(validate(Operation::UpdateTodo, &args), vec!["id"]);
        }

        it "accepts update with only an id" {
            let args = ArgumentSet::new().with("id", 2);
            assert!(validate(Operation::UpdateTodo, &args).is_empty());
        }

        it "treats null as missing" {
            let args = ArgumentSet::from_json(r#"{"title": null}"#).expect("object");
            assert_eq!(validate(Operation::CreateTodo, &args), vec!["title"]);
        }
    }

    describe "tool declarations" {
        it "offers all six operations with their schemas" {
            let tools = tool_declarations();
            let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
            assert_eq!(
                names,
                vec!["create_todo", "get_todos", "update_todo", "delete_todo", "search_todos", "mark_completed"]
            );

            let update = &tools[2];
            assert_eq!(update.parameters["required"], json!(["id"]));
            assert_eq!(update.parameters["properties"]["id"]["type"], "integer");
            assert_eq!(update.parameters["properties"]["due_date"]["format"], "date");
            assert!(tools[1].parameters.get("required").is_none());
        }
    }
}
