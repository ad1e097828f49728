#[macro_use]
extern crate cfg_if;

mod app;

use app::App;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut app = App::default();
    while !app.is_done() {
        if let Err(err) = app.update() {
            log::error!("{}", err);
            std::process::exit(1);
        }
    }
}
