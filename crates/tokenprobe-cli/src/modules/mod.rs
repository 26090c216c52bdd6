pub(crate) mod refresh;
pub(crate) mod report;
pub(crate) mod system;
