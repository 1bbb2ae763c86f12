#![no_std]

pub mod hash;
