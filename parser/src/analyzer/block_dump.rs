use std::io::Write;

use serde::Serialize;
use tracing::warn;

use crate::analyzer::Analyzer;
use crate::demo::Block;

#[derive(Serialize)]
struct DumpLine<'a> {
    index: usize,
    #[serde(flatten)]
    block: &'a Block,
}

/// Writes every block as one line of JSON.
pub struct BlockDump<W: Write> {
    output: W,
    index: usize,
    failed: bool,
}

impl<W: Write> BlockDump<W> {
    pub fn new(output: W) -> Self {
        Self {
            output,
            index: 0,
            failed: false,
        }
    }

    /// Whether any line failed to serialize or write.
    pub fn failed(&self) -> bool {
        self.failed
    }

    pub fn into_inner(self) -> W {
        self.output
    }
}

impl<W: Write> Analyzer for BlockDump<W> {
    fn finish(&mut self) {
        if let Err(e) = self.output.flush() {
            warn!("failed to flush block dump: {e}");
            self.failed = true;
        }
    }

    fn process(&mut self, block: &Block) {
        let line = DumpLine {
            index: self.index,
            block,
        };
        self.index += 1;

        if self.failed {
            return;
        }
        let result = serde_json::to_writer(&mut self.output, &line)
            .map_err(std::io::Error::from)
            .and_then(|_| self.output.write_all(b"\n"));
        if let Err(e) = result {
            warn!("failed to dump block {}: {e}", line.index);
            self.failed = true;
        }
    }
}
