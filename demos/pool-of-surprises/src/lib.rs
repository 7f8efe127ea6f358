use wasm_bindgen::prelude::*;
use cue_engine::*;

pub mod aiming;
pub mod balls;
pub mod chaos;
pub mod config;
pub mod game;
pub mod physics;
pub mod table;

use game::PoolOfSurprises;

cue_web::export_game!(PoolOfSurprises, "pool-of-surprises");
