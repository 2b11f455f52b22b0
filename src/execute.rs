pub mod builtin;
pub mod dispatch;
pub mod pipeline;
pub mod redir;
