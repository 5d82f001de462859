//! Launch parameter parsing for the viewer.
//!
//! On native, parameters are parsed from command-line arguments using clap.
//! On WASM, defaults are used (CLI argument parsing is not available).
//!
//! Only the map access token is environment-supplied; the model origin,
//! style URL, viewport and physics constants are fixed in code.

use bevy::prelude::*;

/// Default model origin longitude (Bandung, Indonesia).
pub const DEFAULT_LNG: f64 = 107.548529;
/// Default model origin latitude.
pub const DEFAULT_LAT: f64 = -6.973064;

/// Environment variable consulted for the map access token.
pub const ACCESS_TOKEN_ENV: &str = "MAP_ACCESS_TOKEN";

/// Launch parameters for the viewer.
#[derive(Resource, Debug)]
pub struct LaunchParams {
    /// Model origin longitude in degrees.
    pub lng: f64,
    /// Model origin latitude in degrees.
    pub lat: f64,
    /// Access token for the map service, if supplied.
    pub access_token: Option<String>,
}

impl Default for LaunchParams {
    fn default() -> Self {
        Self {
            lng: DEFAULT_LNG,
            lat: DEFAULT_LAT,
            access_token: token_from_env(),
        }
    }
}

/// Read the access token from the environment, treating empty as absent.
fn token_from_env() -> Option<String> {
    #[cfg(not(target_family = "wasm"))]
    {
        std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .filter(|token| !token.is_empty())
    }
    #[cfg(target_family = "wasm")]
    {
        None
    }
}

#[cfg(not(target_family = "wasm"))]
mod native {
    use clap::Parser;

    use super::*;

    #[derive(Parser)]
    #[command(about = "Interactive map demo with a keyboard-driven 3D car")]
    struct CliArgs {
        /// Model origin longitude in degrees.
        #[arg(long, default_value_t = DEFAULT_LNG)]
        lng: f64,

        /// Model origin latitude in degrees.
        #[arg(long, default_value_t = DEFAULT_LAT)]
        lat: f64,

        /// Map service access token (falls back to MAP_ACCESS_TOKEN).
        #[arg(long)]
        access_token: Option<String>,
    }

    pub fn parse() -> LaunchParams {
        let args = CliArgs::parse();
        let access_token = args.access_token.or_else(token_from_env);
        if access_token.is_none() {
            tracing::warn!(
                "no map access token supplied ({} unset); the host map will reject tile requests",
                ACCESS_TOKEN_ENV
            );
        }
        LaunchParams {
            lng: args.lng,
            lat: args.lat,
            access_token,
        }
    }
}

/// Parse launch parameters from CLI args (native) or use defaults (WASM).
pub fn parse() -> LaunchParams {
    #[cfg(not(target_family = "wasm"))]
    {
        native::parse()
    }
    #[cfg(target_family = "wasm")]
    {
        LaunchParams::default()
    }
}
