pub(crate) mod drivers;
pub(crate) mod tasks;
