use clap::Parser;
use colour::{e_green_ln, e_red_ln};
use human_panic::setup_panic;
use tiled_texture::{Arguments, run};

#[tokio::main]
async fn main() {
    setup_panic!();
    let args: Arguments = Arguments::parse();
    init_log(&args);
    if let Err(err) = run(&args).await {
        e_red_ln!("ERROR {}", err);
        std::process::exit(1);
    }
    e_green_ln!("Done!");
}

fn init_log(args: &Arguments) {
    let env = env_logger::Env::new().default_filter_or(args.logging.as_str());
    env_logger::init_from_env(env);
}
