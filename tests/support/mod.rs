#![allow(dead_code)]

pub mod iris_env;
pub mod workspace;
