use marquee::config;
use marquee::gui::app::AppModel;
use marquee::gui::curve::LoopState;
use marquee::sys::runtime;
use relm4::prelude::*;

fn main() {
    env_logger::init();

    let config = config::load_or_setup();
    let state = LoopState::from_config(&config);

    let (tx, rx) = async_channel::bounded(32);

    runtime::start_background_services(tx, config.relay.clone());

    let app = RelmApp::new("dev.portfolio.marquee");

    app.run::<AppModel>((state, rx));
}
