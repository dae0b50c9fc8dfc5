//! 测试用的脚本化后端
#![allow(dead_code)]

use async_trait::async_trait;
use futures::StreamExt;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;

use novel_translate::error::{AppError, AppResult, SetupError};
use novel_translate::services::{FragmentStream, TranslationBackend, TranslationRequest};
use novel_translate::{Chapter, Config, CredentialStore, TranslationOrchestrator};

/// 流中的一步
pub enum Step {
    Text(String),
    Fail(String),
    /// 在拉取下一个片段时执行（模拟用户在流进行中的操作）
    Run(Box<dyn FnOnce() + Send>),
    /// 等待外部放行后再继续吐出后面的片段
    Gate(oneshot::Receiver<()>),
}

pub fn text(s: &str) -> Step {
    Step::Text(s.to_string())
}

pub fn run(f: impl FnOnce() + Send + 'static) -> Step {
    Step::Run(Box::new(f))
}

pub enum Script {
    Steps(Vec<Step>),
    OpenError(String),
}

#[derive(Debug, Clone)]
pub struct Call {
    pub content: String,
    pub instruction: Option<String>,
    pub glossary_len: usize,
}

#[derive(Default)]
pub struct ScriptedBackend {
    scripts: Mutex<HashMap<String, VecDeque<Script>>>,
    calls: Mutex<Vec<Call>>,
    split: Mutex<Option<Vec<Chapter>>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 为某个章节内容追加一段脚本，按调用顺序依次使用
    pub fn script(&self, content: &str, script: Script) {
        self.scripts
            .lock()
            .unwrap()
            .entry(content.to_string())
            .or_default()
            .push_back(script);
    }

    pub fn set_split(&self, chapters: Vec<Chapter>) {
        *self.split.lock().unwrap() = Some(chapters);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_contents(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.content).collect()
    }
}

#[async_trait]
impl TranslationBackend for ScriptedBackend {
    async fn split_chapters(&self, _document: &str) -> AppResult<Vec<Chapter>> {
        match self.split.lock().unwrap().clone() {
            Some(chapters) if !chapters.is_empty() => Ok(chapters),
            _ => Err(AppError::Setup(SetupError::NoChapters)),
        }
    }

    async fn stream_translate(&self, request: TranslationRequest<'_>) -> AppResult<FragmentStream> {
        self.calls.lock().unwrap().push(Call {
            content: request.content.to_string(),
            instruction: request.instruction.map(str::to_string),
            glossary_len: request.glossary.len(),
        });

        let script = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(request.content)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Script::Steps(vec![text("bản dịch")]));

        let steps = match script {
            Script::OpenError(message) => return Err(AppError::Other(message)),
            Script::Steps(steps) => steps,
        };

        let stream = futures::stream::iter(steps).filter_map(|step| async move {
            match step {
                Step::Text(t) => Some(Ok(t)),
                Step::Fail(message) => Some(Err(AppError::Other(message))),
                Step::Run(f) => {
                    f();
                    None
                }
                Step::Gate(gate) => {
                    let _ = gate.await;
                    None
                }
            }
        });
        Ok(stream.boxed())
    }
}

pub fn temp_credentials(with_key: bool) -> CredentialStore {
    let path = std::env::temp_dir()
        .join(format!("novel-translate-test-{}", uuid::Uuid::new_v4()))
        .join("credentials.toml");
    let store = CredentialStore::new(path);
    if with_key {
        store.save("sk-test").unwrap();
    }
    store
}

pub fn credential_path(orchestrator_store: &CredentialStore) -> std::path::PathBuf {
    orchestrator_store.path().to_path_buf()
}

pub fn chapters(entries: &[(&str, &str)]) -> Vec<Chapter> {
    entries.iter().map(|(t, c)| Chapter::new(*t, *c)).collect()
}

/// 创建编排器并装入章节
pub async fn setup(
    entries: &[(&str, &str)],
) -> (Arc<ScriptedBackend>, TranslationOrchestrator<ScriptedBackend>, std::path::PathBuf) {
    let backend = Arc::new(ScriptedBackend::new());
    backend.set_split(chapters(entries));

    let store = temp_credentials(true);
    let path = credential_path(&store);
    let orchestrator = TranslationOrchestrator::new(backend.clone(), store, &Config::default());
    orchestrator.load_document("ignored").await.unwrap();

    (backend, orchestrator, path)
}
