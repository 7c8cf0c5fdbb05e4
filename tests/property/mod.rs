mod cache;
mod retry;
