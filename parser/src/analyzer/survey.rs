use std::cell::{RefCell, RefMut};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::info;

use crate::analyzer::Analyzer;
use crate::demo::Block;
use crate::message::MessageKind;

#[derive(Debug, Default)]
pub struct SurveyStats {
    pub total_blocks: usize,
    pub nop_blocks: usize,
    pub total_messages: usize,
    pub messages_by_kind: HashMap<MessageKind, usize>,
}

impl SurveyStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: MessageKind) -> usize {
        self.messages_by_kind.get(&kind).copied().unwrap_or(0)
    }
}

pub struct Survey {
    stats: Rc<RefCell<SurveyStats>>,
}

impl Survey {
    pub fn new(stats: Rc<RefCell<SurveyStats>>) -> Self {
        Self { stats }
    }
}

impl Analyzer for Survey {
    fn finish(&mut self) {
        let stats = self.stats.borrow();
        let mut kinds: Vec<_> = stats.messages_by_kind.iter().collect();
        kinds.sort_by(|a, b| b.1.cmp(a.1));

        info!(
            "surveyed {} blocks ({} nop) with {} messages",
            stats.total_blocks, stats.nop_blocks, stats.total_messages
        );
        for (kind, count) in kinds {
            info!("  {kind}: {count}");
        }
    }

    fn process(&mut self, block: &Block) {
        let mut stats: RefMut<_> = self.stats.borrow_mut();
        stats.total_blocks += 1;
        if block.is_nop() {
            stats.nop_blocks += 1;
        }
        for message in &block.messages {
            stats.total_messages += 1;
            *stats.messages_by_kind.entry(message.kind()).or_insert(0) += 1;
        }
    }
}
