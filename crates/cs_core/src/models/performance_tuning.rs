//! Partitioning and block IO settings (`calculation_management`).
//!
//! Every setting is stored only when it differs from the solver default;
//! selecting the default removes the corresponding node.

use std::str::FromStr;

use crate::case::Case;
use crate::xml::NodeId;

use super::enums::{BlockIoMethod, PartitionOutput, PartitionType};

/// Default minimum block size for block IO (8 MiB).
pub const DEFAULT_MIN_BLOCK_SIZE: u64 = 8 * 1024 * 1024;

/// Accessors for `calculation_management/partitioning` and `.../block_io`.
pub struct PerformanceTuningModel<'a> {
    case: &'a mut Case,
    node_part: NodeId,
    node_io: NodeId,
}

impl<'a> PerformanceTuningModel<'a> {
    pub fn new(case: &'a mut Case) -> Self {
        let management = case.section("calculation_management");
        let node_part = case.init_child(management, "partitioning", &[]);
        let node_io = case.init_child(management, "block_io", &[]);
        Self {
            case,
            node_part,
            node_io,
        }
    }

    fn parsed<T: FromStr>(&self, parent: NodeId, tag: &str) -> Option<T> {
        let value = self.case.doc().get_string(parent, tag)?;
        match value.parse() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                tracing::warn!("Ignoring invalid {} value '{}'", tag, value);
                None
            }
        }
    }

    /// Store `value` under `tag`, or remove the node when `value` is `None`.
    fn store(&mut self, parent: NodeId, tag: &str, value: Option<String>) {
        match value {
            Some(value) => {
                self.case.doc_mut().set_data(parent, tag, value);
            }
            None => {
                if self.case.doc().child(parent, tag, &[]).is_some() {
                    self.case.doc_mut().remove_children(parent, tag, &[]);
                }
            }
        }
    }

    /// Path of a previous partitioning to read, if any.
    pub fn partition_input_path(&self) -> Option<String> {
        let doc = self.case.doc();
        let node = doc.child(self.node_part, "partition_input", &[])?;
        doc.attr(node, "path")
            .filter(|path| !path.is_empty())
            .map(str::to_string)
    }

    /// Set or clear (`None` or empty) the partition input path.
    pub fn set_partition_input_path(&mut self, path: Option<&str>) {
        let part = self.node_part;
        match path.filter(|path| !path.is_empty()) {
            Some(path) => {
                let doc = self.case.doc_mut();
                let node = doc.init_child(part, "partition_input", &[]);
                doc.set_attr(node, "path", path);
            }
            None => {
                if self.case.doc().child(part, "partition_input", &[]).is_some() {
                    self.case.doc_mut().remove_children(part, "partition_input", &[]);
                }
            }
        }
    }

    pub fn partition_type(&self) -> PartitionType {
        self.parsed(self.node_part, "type").unwrap_or_default()
    }

    pub fn set_partition_type(&mut self, value: PartitionType) {
        let stored = (value != PartitionType::Default).then(|| value.to_string());
        self.store(self.node_part, "type", stored);
    }

    pub fn partition_output(&self) -> PartitionOutput {
        self.parsed(self.node_part, "output").unwrap_or_default()
    }

    pub fn set_partition_output(&mut self, value: PartitionOutput) {
        let stored = (value != PartitionOutput::Default).then(|| value.to_string());
        self.store(self.node_part, "output", stored);
    }

    /// Space-separated list of partition counts to compute (empty by default).
    pub fn partition_list(&self) -> String {
        self.case
            .doc()
            .get_string(self.node_part, "partition_list")
            .unwrap_or_default()
    }

    pub fn set_partition_list(&mut self, parts: &str) {
        let parts = parts.trim();
        let stored = (!parts.is_empty()).then(|| parts.to_string());
        self.store(self.node_part, "partition_list", stored);
    }

    pub fn partition_rank_step(&self) -> u32 {
        self.parsed(self.node_part, "rank_step").unwrap_or(1)
    }

    /// Steps below 2 mean "every rank" and are not stored.
    pub fn set_partition_rank_step(&mut self, step: u32) {
        let stored = (step >= 2).then(|| step.to_string());
        self.store(self.node_part, "rank_step", stored);
    }

    /// Whether periodicity is ignored when partitioning (default off).
    pub fn ignore_periodicity(&self) -> bool {
        let doc = self.case.doc();
        doc.child(self.node_part, "ignore_periodicity", &[])
            .and_then(|node| doc.attr(node, "status"))
            == Some("on")
    }

    pub fn set_ignore_periodicity(&mut self, ignore: bool) {
        let part = self.node_part;
        if ignore {
            let doc = self.case.doc_mut();
            let node = doc.init_child(part, "ignore_periodicity", &[]);
            doc.set_attr(node, "status", "on");
        } else if self.case.doc().child(part, "ignore_periodicity", &[]).is_some() {
            self.case.doc_mut().remove_children(part, "ignore_periodicity", &[]);
        }
    }

    pub fn block_io_read_method(&self) -> BlockIoMethod {
        self.parsed(self.node_io, "read_method").unwrap_or_default()
    }

    pub fn set_block_io_read_method(&mut self, method: BlockIoMethod) {
        let stored = (method != BlockIoMethod::Default).then(|| method.to_string());
        self.store(self.node_io, "read_method", stored);
    }

    pub fn block_io_write_method(&self) -> BlockIoMethod {
        self.parsed(self.node_io, "write_method").unwrap_or_default()
    }

    pub fn set_block_io_write_method(&mut self, method: BlockIoMethod) {
        let stored = (method != BlockIoMethod::Default).then(|| method.to_string());
        self.store(self.node_io, "write_method", stored);
    }

    pub fn block_io_rank_step(&self) -> u32 {
        self.parsed(self.node_io, "rank_step").unwrap_or(1)
    }

    pub fn set_block_io_rank_step(&mut self, step: u32) {
        let stored = (step >= 2).then(|| step.to_string());
        self.store(self.node_io, "rank_step", stored);
    }

    /// Minimum block size in bytes.
    pub fn block_io_min_size(&self) -> u64 {
        self.parsed(self.node_io, "min_block_size")
            .unwrap_or(DEFAULT_MIN_BLOCK_SIZE)
    }

    pub fn set_block_io_min_size(&mut self, size: u64) {
        let stored = (size != DEFAULT_MIN_BLOCK_SIZE).then(|| size.to_string());
        self.store(self.node_io, "min_block_size", stored);
    }
}
