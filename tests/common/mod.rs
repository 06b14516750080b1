#![allow(dead_code)]

use async_trait::async_trait;
use codecalc::provider::Provider;
use codecalc::wire::CompletionRequest;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// In-memory provider that replays canned replies and records every request.
#[derive(Clone, Default)]
pub struct Scripted {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    seen: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl Scripted {
    pub fn replying(replies: &[&str]) -> Self {
        let s = Scripted::default();
        s.replies.lock().extend(replies.iter().map(|r| Ok(r.to_string())));
        s
    }

    pub fn failing(msg: &str) -> Self {
        let s = Scripted::default();
        s.replies.lock().push_back(Err(msg.to_string()));
        s
    }

    pub fn calls(&self) -> usize {
        self.seen.lock().len()
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl Provider for Scripted {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn complete(&self, req: &CompletionRequest) -> anyhow::Result<String> {
        self.seen.lock().push(req.clone());
        match self.replies.lock().pop_front() {
            Some(Ok(r)) => Ok(r),
            Some(Err(e)) => Err(anyhow::anyhow!(e)),
            None => Ok(String::new()),
        }
    }
}

pub fn project_json(names: &[&str]) -> String {
    let sections: Vec<serde_json::Value> = names
        .iter()
        .map(|n| {
            serde_json::json!({
                "fileName": n,
                "language": if n.ends_with(".xml") { "xml" } else { "java" },
                "code": format!("// {n}"),
                "explanation": format!("what {n} does"),
            })
        })
        .collect();
    serde_json::json!({
        "projectName": "SimpleCalculator",
        "projectTree": "SimpleCalculator/\n└── app/",
        "sections": sections,
    })
    .to_string()
}
