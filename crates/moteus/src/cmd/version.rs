use moteus_protocol::CURRENT_REGISTER_MAP_VERSION;

use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    if !args.extended {
        println!("moteus {}", env!("CARGO_PKG_VERSION"));
        return Ok(SUCCESS);
    }

    println!("name: moteus");
    println!("version: {}", env!("CARGO_PKG_VERSION"));
    println!("register_map_version: {CURRENT_REGISTER_MAP_VERSION}");
    println!("target: {}", env!("MOTEUS_BUILD_TARGET"));
    println!("target_os: {}", std::env::consts::OS);
    println!("target_arch: {}", std::env::consts::ARCH);
    println!("git_hash: {}", option_env!("GIT_HASH").unwrap_or("unknown"));
    println!("features: session={}, cli=true", cfg!(feature = "session"));

    Ok(SUCCESS)
}
