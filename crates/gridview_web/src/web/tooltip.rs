use gridview::hover::HoverInfo;
use leptos::prelude::*;

use crate::ui_model::tooltip_style;

pub(super) type TooltipStore = RwSignal<Option<HoverInfo>>;

/// Resource name floating next to the pointer while it is over a resource.
#[component]
pub(super) fn TooltipPortal(store: TooltipStore) -> impl IntoView {
    let payload = Memo::new(move |_| store.get());

    view! {
        <Show when=move || payload.get().is_some() fallback=|| ()>
            {move || {
                payload.get().map(|p| {
                    let style = tooltip_style(p.left_px, p.top_px);
                    view! {
                        <div class="tooltip" role="tooltip" style=style>
                            {p.name}
                        </div>
                    }
                })
            }}
        </Show>
    }
}
