#![cfg(test)]

mod check;
mod pipeline;
mod support;
mod website;
