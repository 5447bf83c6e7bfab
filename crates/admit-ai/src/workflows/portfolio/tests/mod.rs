mod common;
mod ladder;
mod routing;
mod service;
