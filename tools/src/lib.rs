//! Readers and writers for the files `louvain-cmd` works with.

pub mod edge_list;
