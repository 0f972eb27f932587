//! Pix checkout HTTP entrypoint.
//!
//! Endpoints:
//! - `GET /pix/config` – Current merchant Pix configuration
//! - `PUT /pix/config` – Edit key, key type, merchant name or city (bearer admin token)
//! - `POST /pix/detect` – Guess the type of a raw key
//! - `GET /pix/payload` – Description of the payload endpoint
//! - `POST /pix/payload` – BR Code and QR image link for an amount
//! - `POST /pix/verify` – Decode a BR Code and check its CRC16
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `HOST`, `PORT` control binding address
//! - `CONFIG` points at the JSON configuration file
//! - `OTEL_*` variables enable OpenTelemetry export

use std::process;

use pix_brcode::run::run;

#[tokio::main]
async fn main() {
    let result = run().await;
    if let Err(e) = result {
        println!("{e}");
        process::exit(1)
    }
}
