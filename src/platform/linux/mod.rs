pub mod child;
pub mod fs_scaffold;
pub mod idmap;
pub mod launch;
pub mod pivot;
