use crate::autosave::CaptionField;
use crate::components::ui::{
    Alert, AlertDescription, Button, Card, CardContent, CardDescription, CardHeader, CardItem,
    CardList, CardTitle, Input, Label, Spinner,
};
use crate::models::MediaItem;
use crate::registry::FieldRegistry;
use crate::state::AppContext;
use crate::storage::save_user_to_storage;
use leptos::prelude::*;
use leptos::task::spawn_local;

/// Direction of the caption-status sort. Either way, records with an
/// absent/empty caption come first; the direction only flips the upload-date
/// tiebreak.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SortDir {
    Asc,
    Desc,
}

fn next_sort_dir(dir: Option<SortDir>) -> Option<SortDir> {
    match dir {
        None => Some(SortDir::Asc),
        Some(SortDir::Asc) => Some(SortDir::Desc),
        Some(SortDir::Desc) => Some(SortDir::Asc),
    }
}

pub(crate) fn sort_for_display(items: &[MediaItem], dir: Option<SortDir>) -> Vec<MediaItem> {
    let mut out = items.to_vec();
    if let Some(dir) = dir {
        out.sort_by(|a, b| {
            let a_missing = a.alt_text.trim().is_empty();
            let b_missing = b.alt_text.trim().is_empty();
            // Missing captions first; RFC3339 strings compare in time order.
            b_missing.cmp(&a_missing).then_with(|| match dir {
                SortDir::Asc => a.uploaded_at.cmp(&b.uploaded_at),
                SortDir::Desc => b.uploaded_at.cmp(&a.uploaded_at),
            })
        });
    }
    out
}

pub(crate) fn filter_items(items: Vec<MediaItem>, query: &str) -> Vec<MediaItem> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return items;
    }
    items
        .into_iter()
        .filter(|m| {
            m.title.to_lowercase().contains(&q) || m.file_name.to_lowercase().contains(&q)
        })
        .collect()
}

pub(crate) fn missing_caption_count(items: &[MediaItem]) -> usize {
    items
        .iter()
        .filter(|m| m.alt_text.trim().is_empty())
        .count()
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let email: RwSignal<String> = RwSignal::new(String::new());
    let password: RwSignal<String> = RwSignal::new(String::new());
    let error: RwSignal<Option<String>> = RwSignal::new(None);
    let loading: RwSignal<bool> = RwSignal::new(false);

    let app_state = expect_context::<AppContext>();

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();

        let email_val = email.get();
        let password_val = password.get();
        let mut api_client = app_state.0.api_client.get_untracked();

        loading.set(true);
        error.set(None);

        spawn_local(async move {
            match api_client.login(&email_val, &password_val).await {
                Ok(response) => {
                    api_client.set_token(response.token);
                    api_client.save_to_storage();
                    save_user_to_storage(&response.account);
                    app_state.0.api_client.set(api_client);
                    app_state.0.current_user.set(Some(response.account));
                    let _ = window().location().set_href("/");
                }
                Err(e) => {
                    error.set(Some(e.to_string()));
                }
            }
            loading.set(false);
        });
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto flex min-h-screen w-full max-w-sm flex-col justify-center px-4 py-10">
                <div class="mb-6">
                    <a href="/" class="text-sm font-medium text-foreground">"Altdesk"</a>
                    <div class="text-xs text-muted-foreground">"Alt text, managed in place."</div>
                </div>

                <Card>
                    <CardHeader>
                        <CardTitle class="text-lg">"Sign in"</CardTitle>
                        <CardDescription class="text-xs">
                            "Use your Altdesk account to manage media captions."
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <form class="flex flex-col gap-3" on:submit=on_submit>
                            <div class="flex flex-col gap-1.5">
                                <Label html_for="email" class="text-xs">"Email"</Label>
                                <Input
                                    id="email"
                                    r#type="email"
                                    placeholder="you@example.com"
                                    bind_value=email
                                    required=true
                                />
                            </div>

                            <div class="flex flex-col gap-1.5">
                                <Label html_for="password" class="text-xs">"Password"</Label>
                                <Input
                                    id="password"
                                    r#type="password"
                                    placeholder="••••••••"
                                    bind_value=password
                                    required=true
                                />
                            </div>

                            <Show when=move || error.get().is_some() fallback=|| ().into_view()>
                                {move || {
                                    error.get().map(|e| view! {
                                        <Alert class="border-destructive/30">
                                            <AlertDescription class="text-destructive">{e}</AlertDescription>
                                        </Alert>
                                    })
                                }}
                            </Show>

                            <Button class="w-full" attr:disabled=move || loading.get()>
                                <span class="inline-flex items-center gap-2">
                                    <Show when=move || loading.get() fallback=|| ().into_view()>
                                        <Spinner />
                                    </Show>
                                    {move || if loading.get() { "Signing in..." } else { "Sign in" }}
                                </span>
                            </Button>
                        </form>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
pub fn LibraryPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();

    // Keyboard traversal order for the caption fields rendered below.
    let registry = FieldRegistry::new();
    provide_context(registry);

    let sort_dir: RwSignal<Option<SortDir>> = RwSignal::new(None);
    let filter: RwSignal<String> = RwSignal::new(String::new());

    let load_media = move || {
        let api_client = app_state.0.api_client.get_untracked();

        // Stale-response protection: a refresh while a load is in flight
        // must not let the older response overwrite the newer one.
        let req_id = app_state
            .0
            .media_request_id
            .get_untracked()
            .saturating_add(1);
        app_state.0.media_request_id.set(req_id);

        app_state.0.media_loading.set(true);
        app_state.0.media_error.set(None);

        spawn_local(async move {
            let result = api_client.get_media_list().await;

            if app_state.0.media_request_id.get_untracked() != req_id {
                return;
            }

            match result {
                Ok(items) => {
                    app_state.0.media.set(items);
                }
                Err(e) => {
                    // A dead session on the list load sends the operator back
                    // to login. Save failures never do this; they stay on the
                    // field (see autosave).
                    if e.kind == crate::api::ApiErrorKind::Unauthorized {
                        let mut c = app_state.0.api_client.get_untracked();
                        c.logout();
                        app_state.0.api_client.set(c);
                        app_state.0.current_user.set(None);
                        let _ = window().location().set_href("/login");
                    } else {
                        app_state.0.media_error.set(Some(e.to_string()));
                    }
                }
            }
            app_state.0.media_loading.set(false);
        });
    };

    Effect::new(move |_| {
        load_media();
    });

    let displayed = Memo::new(move |_| {
        let items = filter_items(app_state.0.media.get(), &filter.get());
        sort_for_display(&items, sort_dir.get())
    });

    // Republish the traversal order whenever the rendered order changes.
    Effect::new(move |_| {
        let ids = displayed
            .get()
            .iter()
            .filter(|m| m.is_editable())
            .map(|m| m.id.clone())
            .collect::<Vec<_>>();
        registry.set_order(ids);
    });

    let on_logout = move |_| {
        let mut api_client = app_state.0.api_client.get_untracked();
        api_client.logout();
        app_state.0.api_client.set(api_client);
        app_state.0.current_user.set(None);
        let _ = window().location().set_href("/login");
    };

    let sort_glyph = move || match sort_dir.get() {
        None => "↕",
        Some(SortDir::Asc) => "↑",
        Some(SortDir::Desc) => "↓",
    };

    view! {
        <div class="min-h-screen bg-background">
            <div class="mx-auto w-full max-w-[1080px] px-4 py-8">
                <div class="mb-4 flex items-center justify-between">
                    <div class="space-y-1">
                        <h1 class="text-xl font-semibold">"Altdesk"</h1>
                        <p class="text-xs text-muted-foreground">"Media library"</p>
                    </div>

                    <div class="flex items-center gap-2">
                        <Button
                            attr:disabled=move || app_state.0.media_loading.get()
                            on:click=move |_| load_media()
                        >
                            <span class="inline-flex items-center gap-2">
                                <Show when=move || app_state.0.media_loading.get() fallback=|| ().into_view()>
                                    <Spinner />
                                </Show>
                                {move || if app_state.0.media_loading.get() { "Refreshing" } else { "Refresh" }}
                            </span>
                        </Button>

                        <Button
                            on:click=on_logout
                            class="bg-transparent border border-input text-muted-foreground hover:bg-accent hover:text-accent-foreground"
                        >
                            "Sign out"
                        </Button>
                    </div>
                </div>

                <Show when=move || app_state.0.media_error.get().is_some() fallback=|| ().into_view()>
                    {move || {
                        app_state.0.media_error.get().map(|e| view! {
                            <Alert class="border-destructive/30">
                                <AlertDescription class="text-destructive">{e}</AlertDescription>
                            </Alert>
                        })
                    }}
                </Show>

                <Card>
                    <CardHeader>
                        <CardTitle>"Media"</CardTitle>
                        <CardDescription>
                            {move || {
                                let items = app_state.0.media.get();
                                format!(
                                    "{} items, {} missing alt text",
                                    items.len(),
                                    missing_caption_count(&items)
                                )
                            }}
                        </CardDescription>
                    </CardHeader>

                    <CardContent>
                        <div class="mb-3 max-w-xs">
                            <Input
                                id="media_filter"
                                r#type="text"
                                placeholder="Filter by title or file name"
                                bind_value=filter
                            />
                        </div>

                        // Column header row. The alt-text column is the
                        // sortable one: records still missing a caption sort
                        // first either way.
                        <div class="flex items-center gap-3 border-b pb-2 text-xs font-medium text-muted-foreground">
                            <div class="w-10"></div>
                            <div class="min-w-0 flex-1">"File"</div>
                            <div class="w-24">"Uploaded"</div>
                            <div class="w-80">
                                <button
                                    class="inline-flex cursor-pointer items-center gap-1 hover:text-foreground"
                                    on:click=move |_| sort_dir.set(next_sort_dir(sort_dir.get_untracked()))
                                >
                                    "Alt text" <span>{sort_glyph}</span>
                                </button>
                            </div>
                        </div>

                        <Show
                            when=move || !displayed.get().is_empty()
                            fallback=move || view! {
                                <div class="py-4 text-xs text-muted-foreground">
                                    {move || if app_state.0.media_loading.get() {
                                        "Loading media..."
                                    } else {
                                        "No media found."
                                    }}
                                </div>
                            }
                        >
                            <CardList class="mt-1 gap-0 divide-y">
                                <For
                                    each=move || displayed.get()
                                    key=|m| m.id.clone()
                                    children=move |m: MediaItem| {
                                        let uploaded_day = m
                                            .uploaded_at
                                            .split('T')
                                            .next()
                                            .unwrap_or_default()
                                            .to_string();

                                        let caption_cell = if let Some(token) = m.edit_token.clone() {
                                            view! {
                                                <CaptionField
                                                    record_id=m.id.clone()
                                                    edit_token=token
                                                    initial=m.alt_text.clone()
                                                    label=m.title.clone()
                                                />
                                            }
                                            .into_any()
                                        } else {
                                            // The viewer may not edit this record.
                                            let text = if m.alt_text.is_empty() {
                                                "—".to_string()
                                            } else {
                                                m.alt_text.clone()
                                            };
                                            view! {
                                                <div class="truncate text-sm text-muted-foreground">{text}</div>
                                            }
                                            .into_any()
                                        };

                                        view! {
                                            <CardItem class="gap-3 py-2">
                                                <img
                                                    src=m.thumbnail_url.clone()
                                                    alt=""
                                                    class="size-10 shrink-0 rounded object-cover"
                                                />
                                                <div class="min-w-0 flex-1">
                                                    <div class="truncate text-sm font-medium">{m.title.clone()}</div>
                                                    <div class="truncate text-xs text-muted-foreground">{m.file_name.clone()}</div>
                                                </div>
                                                <div class="w-24 text-xs text-muted-foreground">{uploaded_day}</div>
                                                <div class="w-80">{caption_cell}</div>
                                            </CardItem>
                                        }
                                    }
                                />
                            </CardList>
                        </Show>
                    </CardContent>
                </Card>
            </div>
        </div>
    }
}

#[component]
pub fn RootPage() -> impl IntoView {
    let app_state = expect_context::<AppContext>();
    let is_authenticated = move || app_state.0.api_client.get().is_authenticated();

    view! {
        <Show when=is_authenticated fallback=move || view! { <LoginPage /> }>
            <LibraryPage />
        </Show>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, alt: &str, uploaded: &str) -> MediaItem {
        MediaItem {
            id: id.to_string(),
            title: format!("title {id}"),
            file_name: format!("{id}.jpg"),
            thumbnail_url: format!("/t/{id}.jpg"),
            uploaded_at: uploaded.to_string(),
            alt_text: alt.to_string(),
            edit_token: Some(format!("tok-{id}")),
        }
    }

    #[test]
    fn test_sort_missing_captions_first_then_oldest() {
        let items = vec![
            item("a", "a cat", "2024-01-03T00:00:00Z"),
            item("b", "", "2024-01-02T00:00:00Z"),
            item("c", "   ", "2024-01-01T00:00:00Z"),
            item("d", "a dog", "2024-01-04T00:00:00Z"),
        ];

        let sorted = sort_for_display(&items, Some(SortDir::Asc));
        let ids: Vec<&str> = sorted.iter().map(|m| m.id.as_str()).collect();
        // Whitespace-only counts as missing; oldest first within each group.
        assert_eq!(ids, vec!["c", "b", "a", "d"]);
    }

    #[test]
    fn test_sort_desc_flips_date_only() {
        let items = vec![
            item("a", "a cat", "2024-01-03T00:00:00Z"),
            item("b", "", "2024-01-02T00:00:00Z"),
            item("c", "", "2024-01-01T00:00:00Z"),
        ];

        let sorted = sort_for_display(&items, Some(SortDir::Desc));
        let ids: Vec<&str> = sorted.iter().map(|m| m.id.as_str()).collect();
        // Missing still first, newest first within each group.
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_unsorted_keeps_server_order() {
        let items = vec![
            item("a", "", "2024-01-03T00:00:00Z"),
            item("b", "x", "2024-01-02T00:00:00Z"),
        ];
        let out = sort_for_display(&items, None);
        let ids: Vec<&str> = out.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_filter_matches_title_and_file_name() {
        let items = vec![
            item("a", "", "2024-01-01T00:00:00Z"),
            item("b", "", "2024-01-01T00:00:00Z"),
        ];

        let out = filter_items(items.clone(), "title a");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "a");

        let out = filter_items(items.clone(), "B.JPG");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "b");

        let out = filter_items(items, "   ");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_missing_caption_count_trims() {
        let items = vec![
            item("a", "", "2024-01-01T00:00:00Z"),
            item("b", "  ", "2024-01-01T00:00:00Z"),
            item("c", "a dog", "2024-01-01T00:00:00Z"),
        ];
        assert_eq!(missing_caption_count(&items), 2);
    }

    #[test]
    fn test_next_sort_dir_cycles_asc_desc() {
        assert_eq!(next_sort_dir(None), Some(SortDir::Asc));
        assert_eq!(next_sort_dir(Some(SortDir::Asc)), Some(SortDir::Desc));
        assert_eq!(next_sort_dir(Some(SortDir::Desc)), Some(SortDir::Asc));
    }
}
