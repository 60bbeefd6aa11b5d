use leptos::html::Canvas;
use leptos::*;
use std::rc::Rc;
use std::time::Duration;

use crate::{
    application::{OverlayConfig, runtime::OverlayRuntime},
    domain::{
        chart::{PixelPos, Viewport},
        drawing::Tool,
        logging::{LogComponent, get_logger},
        market_data::Symbol,
    },
    infrastructure::rendering::Canvas2dSurface,
};

fn pointer_pos(event: &web_sys::PointerEvent) -> PixelPos {
    PixelPos::new(event.offset_x() as f64, event.offset_y() as f64)
}

/// 🎨 Drawing overlay stacked above the host chart canvas
///
/// One runtime lives exactly as long as the component: created on mount,
/// torn down on cleanup. Changing `symbol` releases the previous stream
/// before the new one is attached.
#[component]
pub fn OverlayCanvas(
    #[prop(into)] symbol: Signal<String>,
    #[prop(into)] viewport: Signal<Viewport>,
    #[prop(into)] tool: Signal<Tool>,
    #[prop(optional)] config: Option<OverlayConfig>,
) -> impl IntoView {
    let config = config.unwrap_or_default();
    let sync_every = Duration::from_millis(u64::from(config.sync_interval_ms));
    let runtime = OverlayRuntime::browser(config);
    let (status, set_status) = create_signal(runtime.status());
    let canvas_ref = create_node_ref::<Canvas>();

    canvas_ref.on_load({
        let runtime = Rc::clone(&runtime);
        move |canvas| match Canvas2dSurface::from_canvas(&canvas) {
            Ok(surface) => runtime.attach_surface(Box::new(surface)),
            Err(error) => set_status.set(error.to_string()),
        }
    });

    create_effect({
        let runtime = Rc::clone(&runtime);
        move |_| {
            let viewport = viewport.get();
            runtime.update(|overlay| overlay.set_viewport(viewport));
        }
    });

    create_effect({
        let runtime = Rc::clone(&runtime);
        move |_| {
            let tool = tool.get();
            runtime.update(|overlay| overlay.set_tool(tool));
        }
    });

    create_effect({
        let runtime = Rc::clone(&runtime);
        move |_| {
            let symbol = match Symbol::new(&symbol.get()) {
                Ok(symbol) => symbol,
                Err(error) => {
                    set_status.set(error);
                    return;
                }
            };
            let runtime = Rc::clone(&runtime);
            spawn_local(async move {
                if runtime.clone().load_symbol(symbol).await.is_ok() {
                    let _ = runtime.clone().sync_annotations().await;
                }
                set_status.set(runtime.status());
            });
        }
    });

    let sync_timer = set_interval_with_handle(
        {
            let runtime = Rc::clone(&runtime);
            move || {
                let runtime = Rc::clone(&runtime);
                spawn_local(async move {
                    if let Err(error) = runtime.sync_annotations().await {
                        get_logger().debug(
                            LogComponent::Presentation("OverlayCanvas"),
                            &format!("periodic sync skipped: {error}"),
                        );
                    }
                });
            }
        },
        sync_every,
    );

    on_cleanup({
        let runtime = Rc::clone(&runtime);
        move || {
            if let Ok(timer) = sync_timer {
                timer.clear();
            }
            runtime.teardown();
        }
    });

    // Capture keeps move/up flowing to the canvas after the pointer leaves it.
    let on_pointer_down = {
        let runtime = Rc::clone(&runtime);
        move |event: web_sys::PointerEvent| {
            if let Some(canvas) = canvas_ref.get_untracked() {
                if let Err(error) = canvas.set_pointer_capture(event.pointer_id()) {
                    get_logger().debug(
                        LogComponent::Presentation("OverlayCanvas"),
                        &format!("pointer capture refused: {error:?}"),
                    );
                }
            }
            runtime.update(|overlay| overlay.pointer_down(pointer_pos(&event)));
        }
    };
    let on_pointer_move = {
        let runtime = Rc::clone(&runtime);
        move |event: web_sys::PointerEvent| {
            runtime.update(|overlay| overlay.pointer_move(pointer_pos(&event)));
        }
    };
    let on_pointer_up = {
        let runtime = Rc::clone(&runtime);
        move |event: web_sys::PointerEvent| {
            runtime.update(|overlay| overlay.pointer_up(pointer_pos(&event)));
        }
    };
    let on_pointer_cancel = {
        let runtime = Rc::clone(&runtime);
        move |_: web_sys::PointerEvent| {
            runtime.update(|overlay| overlay.cancel_gesture());
        }
    };
    let on_key_down = {
        let runtime = Rc::clone(&runtime);
        move |event: web_sys::KeyboardEvent| {
            if event.key() == "Escape" {
                runtime.update(|overlay| overlay.cancel_gesture());
            }
        }
    };

    view! {
        <div class="chart-overlay">
            <canvas
                node_ref=canvas_ref
                tabindex="0"
                width=move || viewport.get().width
                height=move || viewport.get().height
                style="position: absolute; inset: 0; cursor: crosshair;"
                on:pointerdown=on_pointer_down
                on:pointermove=on_pointer_move
                on:pointerup=on_pointer_up
                on:pointercancel=on_pointer_cancel
                on:keydown=on_key_down
            />
            <div class="overlay-status">{move || status.get()}</div>
        </div>
    }
}
