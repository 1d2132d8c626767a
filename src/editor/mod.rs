//! 文档文本索引与编辑
//!
//! - `entry`: 可编辑条目及其对文档节点的弱引用
//! - `collector`: 扫描文档生成条目
//! - `mutator`: 单条编辑与全量替换，修改文档的唯一途径

pub mod collector;
pub mod entry;
pub mod mutator;

pub use collector::{scan, ScanStats, TextIndexer};
pub use entry::{Entry, EntryKind, EntrySummary};
pub use mutator::{apply_edit, replace_all};
