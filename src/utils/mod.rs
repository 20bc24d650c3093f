// src/utils/mod.rs

pub mod extract;
pub mod gamification;
pub mod hash;
pub mod html;
pub mod jwt;
