mod asset;
mod catalog;
mod common;
mod project;
mod repository;
