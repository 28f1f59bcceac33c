use crate::demo::Block;

pub trait Analyzer {
    fn process(&mut self, block: &Block);
    fn finish(&mut self);
}
