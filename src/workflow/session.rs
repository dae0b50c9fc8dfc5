//! 会话状态
//!
//! 一次会话（一份文档）内的全部可变状态：章节、状态表、译文缓存、批量标志、
//! 凭据就绪标志、翻译上下文、术语表和通知。
//!
//! 后台翻译循环与用户操作（取消、换 Key）共享同一个 [`SessionHandle`]。
//! 锁只在一次读或写期间持有，绝不跨越 `.await`，所以循环在每个挂起点之后
//! 读到的都是最新状态，而不是启动时的快照。

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{DEFAULT_STORY_CONTEXT, DEFAULT_WORLD_CONTEXT};
use crate::models::{
    merge_terms, Chapter, ChapterStatus, ChapterStatusInfo, GlossaryTerm, MergeReport,
    Notification,
};

#[derive(Debug, Clone)]
pub struct SessionState {
    chapters: Vec<Chapter>,
    statuses: HashMap<String, ChapterStatusInfo>,
    /// 每章当前有效的翻译尝试编号
    attempts: HashMap<String, u64>,
    /// 会话内单调递增，reset 之后也不回退
    attempt_seq: u64,
    cache: HashMap<String, String>,
    selected: Option<String>,
    live_translation: String,
    batch_active: bool,
    credential_ready: bool,
    story_context: String,
    world_context: String,
    glossary: Vec<GlossaryTerm>,
    notifications: Vec<Notification>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(DEFAULT_STORY_CONTEXT, DEFAULT_WORLD_CONTEXT)
    }
}

impl SessionState {
    pub fn new(story_context: impl Into<String>, world_context: impl Into<String>) -> Self {
        Self {
            chapters: Vec::new(),
            statuses: HashMap::new(),
            attempts: HashMap::new(),
            attempt_seq: 0,
            cache: HashMap::new(),
            selected: None,
            live_translation: String::new(),
            batch_active: false,
            credential_ready: false,
            story_context: story_context.into(),
            world_context: world_context.into(),
            glossary: Vec::new(),
            notifications: Vec::new(),
        }
    }

    // ========== 章节 ==========

    /// 装入分章结果，每章一个 Idle 状态
    pub fn install_chapters(&mut self, chapters: Vec<Chapter>) {
        self.statuses = chapters
            .iter()
            .map(|c| (c.title.clone(), ChapterStatusInfo::idle()))
            .collect();
        self.chapters = chapters;
        self.attempts.clear();
        self.cache.clear();
        self.selected = None;
        self.live_translation.clear();
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn chapter(&self, title: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.title == title)
    }

    pub fn knows(&self, title: &str) -> bool {
        self.statuses.contains_key(title)
    }

    /// 章节在原文中的位置
    pub fn position(&self, title: &str) -> Option<usize> {
        self.chapters.iter().position(|c| c.title == title)
    }

    /// 删除章节及其状态和译文
    pub fn delete_chapter(&mut self, title: &str) -> bool {
        let before = self.chapters.len();
        self.chapters.retain(|c| c.title != title);
        self.statuses.remove(title);
        self.attempts.remove(title);
        self.cache.remove(title);
        if self.selected.as_deref() == Some(title) {
            self.selected = None;
            self.live_translation.clear();
        }
        self.chapters.len() != before
    }

    /// 按原文顺序排列；不属于当前文档的章节被丢弃
    pub fn in_document_order(&self, chapters: &[Chapter]) -> Vec<Chapter> {
        let mut known: Vec<(usize, Chapter)> = chapters
            .iter()
            .filter_map(|c| self.position(&c.title).map(|pos| (pos, c.clone())))
            .collect();
        known.sort_by_key(|(pos, _)| *pos);
        known.dedup_by_key(|(pos, _)| *pos);
        known.into_iter().map(|(_, c)| c).collect()
    }

    /// 所有未翻译或出错的章节（原文顺序）
    pub fn pending_chapters(&self) -> Vec<Chapter> {
        self.chapters
            .iter()
            .filter(|c| self.status_kind(&c.title).is_pending())
            .cloned()
            .collect()
    }

    /// 选中章节中未翻译或出错的部分（原文顺序）
    pub fn pending_among(&self, titles: &HashSet<String>) -> Vec<Chapter> {
        self.chapters
            .iter()
            .filter(|c| titles.contains(&c.title) && self.status_kind(&c.title).is_pending())
            .cloned()
            .collect()
    }

    // ========== 状态 ==========

    pub fn status(&self, title: &str) -> Option<&ChapterStatusInfo> {
        self.statuses.get(title)
    }

    pub fn status_kind(&self, title: &str) -> ChapterStatus {
        self.statuses
            .get(title)
            .map(|s| s.status)
            .unwrap_or_default()
    }

    pub fn is_translating(&self, title: &str) -> bool {
        self.status_kind(title) == ChapterStatus::Translating
    }

    /// 只更新已知章节的状态，保证每个标题恰好一条状态
    pub fn set_status(&mut self, title: &str, info: ChapterStatusInfo) -> bool {
        match self.statuses.get_mut(title) {
            Some(slot) => {
                *slot = info;
                true
            }
            None => false,
        }
    }

    // ========== 翻译尝试 ==========

    /// 开始新的一次翻译尝试：Translating / 0%，之前的尝试全部失效
    pub fn begin_attempt(&mut self, title: &str) -> Option<u64> {
        if !self.set_status(title, ChapterStatusInfo::translating(0)) {
            return None;
        }
        Some(self.supersede(title))
    }

    pub fn attempt(&self, title: &str) -> u64 {
        self.attempts.get(title).copied().unwrap_or_default()
    }

    /// 该尝试是否仍然有效（没有被取消、换 Key 或更新的请求接管）
    pub fn is_current(&self, title: &str, attempt: u64) -> bool {
        self.attempts.get(title) == Some(&attempt) && self.is_translating(title)
    }

    /// 让该章节正在进行的尝试失效，返回新的编号
    fn supersede(&mut self, title: &str) -> u64 {
        self.attempt_seq += 1;
        self.attempts.insert(title.to_string(), self.attempt_seq);
        self.attempt_seq
    }

    /// 取消单章翻译：回到 Idle，清空缓存与正在显示的译文
    pub fn cancel(&mut self, title: &str) {
        if !self.knows(title) {
            return;
        }
        self.supersede(title);
        if self.selected.as_deref() == Some(title) {
            self.live_translation.clear();
        }
        self.set_status(title, ChapterStatusInfo::idle());
        self.cache.remove(title);
    }

    /// 把所有翻译中的章节标记为出错（保留进度），返回受影响的数量
    pub fn halt_translating(&mut self, message: &str) -> usize {
        let mut halted = Vec::new();
        for (title, info) in self.statuses.iter_mut() {
            if info.status == ChapterStatus::Translating {
                *info = ChapterStatusInfo::failed(info.progress, message);
                halted.push(title.clone());
            }
        }
        for title in &halted {
            self.supersede(title);
        }
        halted.len()
    }

    // ========== 译文缓存与显示 ==========

    pub fn cached(&self, title: &str) -> Option<&str> {
        self.cache.get(title).map(String::as_str)
    }

    pub fn has_cache(&self, title: &str) -> bool {
        self.cache.contains_key(title)
    }

    /// 写入缓存；若该章节正在显示，同时刷新显示
    pub fn store_translation(&mut self, title: &str, text: &str) {
        self.cache.insert(title.to_string(), text.to_string());
        if self.selected.as_deref() == Some(title) {
            self.live_translation = text.to_string();
        }
    }

    pub fn clear_translation(&mut self, title: &str) {
        self.cache.remove(title);
        if self.selected.as_deref() == Some(title) {
            self.live_translation.clear();
        }
    }

    /// 选中章节，显示其缓存译文
    pub fn select(&mut self, title: &str) -> bool {
        if !self.knows(title) {
            return false;
        }
        self.live_translation = self.cache.get(title).cloned().unwrap_or_default();
        self.selected = Some(title.to_string());
        true
    }

    pub fn deselect(&mut self) {
        self.selected = None;
        self.live_translation.clear();
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn live_translation(&self) -> &str {
        &self.live_translation
    }

    /// 用户手动修改当前显示的译文
    pub fn edit_live_translation(&mut self, text: impl Into<String>) {
        self.live_translation = text.into();
        if let Some(title) = &self.selected {
            self.cache.insert(title.clone(), self.live_translation.clone());
        }
    }

    // ========== 标志 ==========

    pub fn batch_active(&self) -> bool {
        self.batch_active
    }

    pub fn set_batch_active(&mut self, active: bool) {
        self.batch_active = active;
    }

    pub fn credential_ready(&self) -> bool {
        self.credential_ready
    }

    pub fn set_credential_ready(&mut self, ready: bool) {
        self.credential_ready = ready;
    }

    // ========== 上下文与术语表 ==========

    pub fn story_context(&self) -> &str {
        &self.story_context
    }

    pub fn world_context(&self) -> &str {
        &self.world_context
    }

    pub fn update_settings(&mut self, story_context: impl Into<String>, world_context: impl Into<String>) {
        self.story_context = story_context.into();
        self.world_context = world_context.into();
    }

    pub fn glossary(&self) -> &[GlossaryTerm] {
        &self.glossary
    }

    pub fn set_glossary(&mut self, glossary: Vec<GlossaryTerm>) {
        self.glossary = glossary;
    }

    pub fn merge_new_terms(&mut self, terms: Vec<GlossaryTerm>) -> MergeReport {
        merge_terms(&mut self.glossary, terms)
    }

    // ========== 通知 ==========

    /// 新通知放在最前面
    pub fn push_notification(&mut self, notification: Notification) {
        self.notifications.insert(0, notification);
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn notification(&self, id: &str) -> Option<&Notification> {
        self.notifications.iter().find(|n| n.id == id)
    }

    pub fn mark_read(&mut self, id: &str) -> bool {
        match self.notifications.iter_mut().find(|n| n.id == id) {
            Some(n) => {
                n.read = true;
                true
            }
            None => false,
        }
    }

    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }

    pub fn unread_count(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    // ========== 重置 ==========

    /// 回到初始状态；凭据就绪标志不属于文档会话，保持不变
    pub fn reset(&mut self) {
        let credential_ready = self.credential_ready;
        let attempt_seq = self.attempt_seq;
        *self = Self::default();
        self.credential_ready = credential_ready;
        self.attempt_seq = attempt_seq;
    }
}

/// 可在后台任务之间共享的会话句柄
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<Mutex<SessionState>>,
}

impl SessionHandle {
    pub fn new(state: SessionState) -> Self {
        Self {
            inner: Arc::new(Mutex::new(state)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 读取当前状态
    pub fn read<R>(&self, f: impl FnOnce(&SessionState) -> R) -> R {
        f(&self.lock())
    }

    /// 修改当前状态
    pub fn update<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        f(&mut self.lock())
    }

    /// 当前状态的完整拷贝
    pub fn snapshot(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn status(&self, title: &str) -> ChapterStatusInfo {
        self.read(|s| s.status(title).cloned().unwrap_or_default())
    }
}
