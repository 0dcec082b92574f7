//! User-facing commands, each implemented as a method on [`App`](crate::App).

mod release;
