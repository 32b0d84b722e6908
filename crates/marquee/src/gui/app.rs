use crate::config;
use crate::events::AppEvent;
use crate::gui::curve::{self, Activation, CLICK_SLOP, LoopState};
use crate::gui::theme::{self, ThemeColors};
use crate::gui::window;
use gtk::gio;
use gtk::prelude::*;
use gtk4 as gtk;
use relm4::prelude::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

pub struct AppModel {
    pub state: Rc<RefCell<LoopState>>,
    pub drawing_area: gtk::DrawingArea,
    tick: Option<gtk::TickCallbackId>,
}

#[derive(Debug)]
pub enum AppMsg {
    PointerEnter,
    PointerLeave,
    ConfigReload,
    Quit,
}

impl From<AppEvent> for AppMsg {
    fn from(event: AppEvent) -> Self {
        match event {
            AppEvent::ConfigReload => AppMsg::ConfigReload,
        }
    }
}

#[relm4::component(pub)]
impl SimpleComponent for AppModel {
    type Init = (LoopState, async_channel::Receiver<AppEvent>);
    type Input = AppMsg;
    type Output = ();

    view! {
        #[root]
        gtk::ApplicationWindow {
            set_title: Some("Marquee"),
            set_default_size: (window::DEFAULT_WIDTH, banner_height),
            add_css_class: "marquee-window",
            set_decorated: false,

            add_controller = gtk::EventControllerKey {
                connect_key_pressed[sender] => move |_, key, _, _| {
                    if key == gtk::gdk::Key::Escape {
                        sender.input(AppMsg::Quit);
                        return glib::Propagation::Stop;
                    }
                    glib::Propagation::Proceed
                }
            },

            #[name = "drawing_area"]
            gtk::DrawingArea {
                set_hexpand: true,
                set_vexpand: true,
                add_css_class: "marquee-drawing-area",

                add_controller = gtk::EventControllerMotion {
                    connect_enter[sender] => move |_, _, _| {
                        sender.input(AppMsg::PointerEnter);
                    },
                    connect_leave[sender] => move |_| {
                        sender.input(AppMsg::PointerLeave);
                    }
                }
            }
        }
    }

    fn init(
        init: Self::Init,
        root: Self::Root,
        sender: ComponentSender<Self>,
    ) -> ComponentParts<Self> {
        let (state, rx) = init;
        let banner_height = window::banner_height(&state);

        theme::load_css();
        window::init_layer_shell(&root);

        let model = AppModel {
            state: Rc::new(RefCell::new(state)),
            drawing_area: gtk::DrawingArea::default(),
            tick: None,
        };

        let widgets = view_output!();

        let mut model = model;
        model.drawing_area = widgets.drawing_area.clone();
        model
            .drawing_area
            .set_cursor_from_name(Some(idle_cursor(&model.state.borrow())));

        let state_draw = model.state.clone();
        widgets
            .drawing_area
            .set_draw_func(move |drawing_area, cr, width, height| {
                let colors = ThemeColors::from_context(&drawing_area.style_context());
                let mut state = state_draw.borrow_mut();
                if let Err(e) = curve::draw(
                    cr,
                    &mut state,
                    f64::from(width),
                    f64::from(height),
                    &colors,
                ) {
                    log::error!("Drawing error: {}", e);
                }
            });

        install_drag_handlers(&widgets.drawing_area, &model.state);
        model.tick = Some(start_animation(&widgets.drawing_area, &model.state));

        let sender_clone = sender.clone();
        relm4::spawn(async move {
            while let Ok(event) = rx.recv().await {
                sender_clone.input(AppMsg::from(event));
            }
        });

        ComponentParts { model, widgets }
    }

    fn update(&mut self, msg: Self::Input, _sender: ComponentSender<Self>) {
        match msg {
            AppMsg::PointerEnter => {
                self.state.borrow_mut().set_hovered(true);
            }
            AppMsg::PointerLeave => {
                let mut state = self.state.borrow_mut();
                state.pointer_leave();
                self.drawing_area
                    .set_cursor_from_name(Some(idle_cursor(&state)));
            }
            AppMsg::ConfigReload => match config::load_config() {
                Ok(new_config) => {
                    let state = self.state.borrow().reloaded(&new_config);
                    self.drawing_area
                        .set_cursor_from_name(Some(idle_cursor(&state)));
                    *self.state.borrow_mut() = state;
                    self.drawing_area.queue_draw();
                    log::info!("Configuration reloaded");
                }
                Err(e) => log::error!("Failed to reload config: {}", e),
            },
            AppMsg::Quit => relm4::main_application().quit(),
        }
    }

    fn shutdown(&mut self, _widgets: &mut Self::Widgets, _output: relm4::Sender<Self::Output>) {
        if let Some(tick) = self.tick.take() {
            tick.remove();
        }
        self.state.borrow_mut().pointer_leave();
    }
}

fn idle_cursor(state: &LoopState) -> &'static str {
    if state.options().interactive {
        "grab"
    } else {
        "default"
    }
}

/// Drives autonomous scrolling from the frame clock for as long as the
/// returned id is held.
fn start_animation(
    area: &gtk::DrawingArea,
    state: &Rc<RefCell<LoopState>>,
) -> gtk::TickCallbackId {
    let state = state.clone();
    area.add_tick_callback(move |area, _clock| {
        if state.borrow_mut().tick() {
            area.queue_draw();
        }
        glib::ControlFlow::Continue
    })
}

/// Press, scrub and release. A release that barely moved is a click and is
/// hit-tested at the press position.
fn install_drag_handlers(area: &gtk::DrawingArea, state: &Rc<RefCell<LoopState>>) {
    let drag = gtk::GestureDrag::new();
    let press_y = Rc::new(Cell::new(0.0));

    drag.connect_drag_begin(glib::clone!(
        #[weak]
        area,
        #[strong]
        state,
        #[strong]
        press_y,
        move |_, x, y| {
            press_y.set(y);
            if state.borrow_mut().pointer_down(x) {
                area.set_cursor_from_name(Some("grabbing"));
            }
        }
    ));

    drag.connect_drag_update(glib::clone!(
        #[weak]
        area,
        #[strong]
        state,
        move |gesture, dx, _| {
            let Some((start_x, _)) = gesture.start_point() else {
                return;
            };
            if state.borrow_mut().pointer_move(start_x + dx) {
                area.queue_draw();
            }
        }
    ));

    // Emitted before drag-end when the system takes the sequence away.
    drag.connect_cancel(glib::clone!(
        #[strong]
        state,
        move |_, _| {
            state.borrow_mut().pointer_cancel();
        }
    ));

    drag.connect_drag_end(glib::clone!(
        #[weak]
        area,
        #[strong]
        state,
        #[strong]
        press_y,
        move |gesture, dx, dy| {
            let origin = state.borrow_mut().pointer_up();
            area.set_cursor_from_name(Some(idle_cursor(&state.borrow())));

            if let Some(origin_x) = origin
                && dx.hypot(dy) < CLICK_SLOP
            {
                let activation = state.borrow().activation_at(
                    origin_x,
                    press_y.get(),
                    f64::from(area.width()),
                    f64::from(area.height()),
                );
                if let Some(activation) = activation {
                    gesture.set_state(gtk::EventSequenceState::Claimed);
                    activate(activation);
                }
            }
        }
    ));

    area.add_controller(drag);
}

fn activate(activation: Activation) {
    match activation {
        Activation::Callback(callback) => callback.call(),
        Activation::Navigate(href) => {
            log::info!("Opening {}", href);
            if let Err(e) =
                gio::AppInfo::launch_default_for_uri(href.as_str(), None::<&gio::AppLaunchContext>)
            {
                log::error!("Failed to open '{}': {}", href, e);
            }
        }
    }
}
