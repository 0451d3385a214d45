mod machine;

use crate::api::SaveAltTextRequest;
use crate::registry::{focus_element, traversal_key, FieldRegistry};
use crate::state::AppContext;
use icons::{Check, X};
use leptos::prelude::*;
use leptos::task::spawn_local;
use machine::{needs_attention, FieldMachine, Indicator};
use wasm_bindgen::JsCast;

/// Save after this much typing pause. Blur saves immediately.
const DEBOUNCE_MS: i32 = 250;

pub(crate) fn field_dom_id(record_id: &str) -> String {
    format!("alt-field-{record_id}")
}

/// One editable caption cell: debounced autosave, per-field save/error
/// marker, empty-caption highlight, and keyboard traversal to the adjacent
/// field.
///
/// All save state is per-instance; fields share nothing but the session
/// credential in `AppContext`.
#[component]
pub fn CaptionField(
    record_id: String,
    /// Record-scoped token minted by the backend for this record's save
    /// action. Passed through to the save endpoint unmodified.
    edit_token: String,
    /// Caption as loaded from the backing store at render time.
    initial: String,
    /// Media title, used for the field's accessible name.
    label: String,
) -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let registry = expect_context::<FieldRegistry>();

    let machine = StoredValue::new(FieldMachine::new(&initial));
    let value: RwSignal<String> = RwSignal::new(initial);
    let indicator: RwSignal<Indicator> = RwSignal::new(Indicator::Neutral);

    // Armed debounce timer, if any. Cleared and re-armed on every input.
    let timer: StoredValue<Option<i32>> = StoredValue::new(None);

    let record_id_sv = StoredValue::new(record_id);
    let token_sv = StoredValue::new(edit_token);

    // Shared by debounce-fire and blur. The machine guard decides whether a
    // request actually goes out; completions with a stale generation are
    // discarded inside the machine, so a late response from a superseded
    // request can never move the confirmed value or release a newer lock.
    //
    // Timer callbacks can outlive the component (filter/sort can unmount a
    // row), so everything reactive is accessed through the try_ variants.
    let attempt_save = move || {
        let Some(current) = value.try_get_untracked() else {
            return;
        };
        let Some(ticket) = machine
            .try_update_value(|m| m.try_begin_save(&current))
            .flatten()
        else {
            return;
        };

        let (Some(media_id), Some(edit_token)) =
            (record_id_sv.try_get_value(), token_sv.try_get_value())
        else {
            return;
        };
        let Some(api_client) = app_state.0.api_client.try_get_untracked() else {
            return;
        };

        let req = SaveAltTextRequest {
            media_id,
            alt_text: ticket.text.clone(),
            edit_token,
        };

        spawn_local(async move {
            let result = api_client.save_alt_text(req).await;

            // Every failure kind (authorization, transport, server) collapses
            // to the error marker; nothing propagates past this field.
            let _ = machine.try_update_value(|m| match result {
                Ok(()) => m.complete_success(&ticket),
                Err(_) => m.complete_failure(&ticket),
            });
            if let Some(ind) = machine.try_with_value(|m| m.indicator()) {
                let _ = indicator.try_set(ind);
            }
        });
    };

    let clear_timer = move || {
        if let Some(tid) = timer.try_update_value(|t| t.take()).flatten() {
            if let Some(win) = web_sys::window() {
                let _ = win.clear_timeout_with_handle(tid);
            }
        }
    };

    let schedule_save = move || {
        let Some(win) = web_sys::window() else {
            return;
        };

        // Only the latest edit within the window keeps a live timer.
        clear_timer();

        let cb = wasm_bindgen::closure::Closure::once_into_js(move || {
            let _ = timer.try_update_value(|t| *t = None);
            attempt_save();
        });

        let tid = win
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                cb.as_ref().unchecked_ref(),
                DEBOUNCE_MS,
            )
            .unwrap_or(0);
        timer.set_value(Some(tid));
    };

    let on_input = move |ev: web_sys::Event| {
        value.set(event_target_value(&ev));
        machine.update_value(|m| m.on_edit());
        schedule_save();
    };

    let on_blur = move |_ev: web_sys::FocusEvent| {
        // Blur bypasses the timer; same guard applies.
        clear_timer();
        attempt_save();
    };

    let on_keydown = move |ev: web_sys::KeyboardEvent| {
        let Some(key) = traversal_key(&ev.key(), ev.shift_key()) else {
            return;
        };

        // Take over from the browser's tab order even at the boundaries,
        // where the move is a no-op.
        ev.prevent_default();

        if let Some(next_id) = registry.adjacent_of(&record_id_sv.get_value(), key) {
            focus_element(&field_dom_id(&next_id));
        }
    };

    view! {
        <div class="flex items-center gap-2">
            <input
                id=field_dom_id(&record_id_sv.get_value())
                type="text"
                placeholder="Empty"
                aria-label=format!("Alt text for {label}")
                class="h-8 w-full min-w-0 flex-1 rounded-md border border-input bg-transparent px-2.5 py-1 text-sm shadow-xs outline-none focus-visible:border-ring focus-visible:ring-2 focus-visible:ring-ring/50"
                class=("field-needs-attention", move || needs_attention(&value.get()))
                prop:value=move || value.get()
                on:input=on_input
                on:blur=on_blur
                on:keydown=on_keydown
            />
            {move || match indicator.get() {
                Indicator::Neutral => view! { <span class="inline-block size-3.5 shrink-0"></span> }.into_any(),
                Indicator::Success => view! {
                    <span
                        class="inline-flex size-3.5 shrink-0 items-center justify-center rounded-full bg-green-600 text-white"
                        title="Saved as you type"
                    >
                        <Check class="size-2.5" />
                    </span>
                }.into_any(),
                Indicator::Error => view! {
                    <span
                        class="inline-flex size-3.5 shrink-0 items-center justify-center rounded-full border border-red-600 bg-white text-red-600"
                        title="Failed to save"
                    >
                        <X class="size-2.5" />
                    </span>
                }.into_any(),
            }}
        </div>
    }
}
