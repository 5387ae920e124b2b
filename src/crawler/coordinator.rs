//! Crawler coordinator - mirror run orchestration
//!
//! A run goes through four stages:
//! - Setup: clear the output directory and open an authenticated session
//! - Redirect discovery: resolve every redirect page into the redirect table
//! - Content rendering: stylesheet, favicon, every content page and its images
//! - Finalize: move the home page to `index.html`
//!
//! Each stage's tasks share one `JoinSet`, which is drained completely before
//! the next stage starts.

use crate::config::Config;
use crate::crawler::tasks::{contain, contain_join_error};
use crate::images::mirror_image;
use crate::output::{clear_output_dir, move_home_to_index, output_path, RunSummary};
use crate::render::{fetch_stylesheet, render_page, write_page, FAVICON_PATH, STYLESHEET_PATH};
use crate::state::{CounterSnapshot, Counters};
use crate::url::{normalize_image_url, normalize_title, LinkRewriter, RedirectTable, RedirectTableBuilder};
use crate::wiki::{PageListing, WikiClient};
use crate::{MirrorError, Result};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::pin::pin;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{JoinError, JoinSet};

/// Outcome of a redirect-resolution task: `(source title, target title)`
type ResolvedRedirect = Option<(String, String)>;

/// Main mirror coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    client: Arc<WikiClient>,
    counters: Arc<Counters>,
    output_dir: Arc<Path>,
    mirrored_at: DateTime<Utc>,
}

impl Coordinator {
    /// Prepares a run: clears the output directory and logs in
    ///
    /// # Errors
    ///
    /// Fails if the output directory cannot be cleared or the login is rejected.
    pub async fn setup(config: Config) -> Result<Self> {
        let output_dir = PathBuf::from(&config.output.directory);
        clear_output_dir(&output_dir, &config.output.preserve).await?;
        tracing::info!("Cleared output directory {}", output_dir.display());

        let client = WikiClient::connect(&config).await?;
        Ok(Self::with_client(config, client))
    }

    /// Creates a coordinator around an already connected client
    pub fn with_client(config: Config, client: WikiClient) -> Self {
        Self {
            output_dir: Arc::from(Path::new(&config.output.directory)),
            config: Arc::new(config),
            client: Arc::new(client),
            counters: Arc::new(Counters::new()),
            mirrored_at: Utc::now(),
        }
    }

    /// Current values of the run counters
    pub fn counters(&self) -> CounterSnapshot {
        self.counters.snapshot()
    }

    /// Runs redirect discovery, content rendering and finalization
    pub async fn run(&self) -> Result<RunSummary> {
        let start_time = Instant::now();

        let redirects = self.discover_redirects().await?;
        tracing::info!("Redirect table complete: {} entries", redirects.len());

        self.render_content(Arc::new(redirects)).await?;
        self.finalize().await?;

        let summary = RunSummary::new(
            self.counters(),
            self.config.thresholds,
            start_time.elapsed(),
        );
        tracing::info!(
            "Mirror finished: {} pages processed, {} exceptions suppressed, {}",
            summary.counters.processed_pages,
            summary.counters.suppressed_exceptions,
            summary.verdict.as_str()
        );
        Ok(summary)
    }

    /// Builds the redirect table from every redirect page
    ///
    /// Returns only after every resolution task has finished; the builder is
    /// consumed here, so nothing can add a redirect afterwards.
    ///
    /// # Errors
    ///
    /// Only enumeration failures are returned; a failed resolution is contained.
    pub async fn discover_redirects(&self) -> Result<RedirectTable> {
        let home = normalize_title(&self.config.wiki.home_page);
        let mut builder = RedirectTableBuilder::new();
        builder.insert(&home, "");

        let mut tasks: JoinSet<ResolvedRedirect> = JoinSet::new();

        for &namespace in &self.config.wiki.namespaces {
            let mut listing = pin!(self.client.list_pages(namespace, true)?);
            while let Some(page) = listing.next().await {
                self.spawn_redirect(&mut tasks, page?);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(Some((source, target))) => {
                    // The home page is written as index.html
                    let target = if normalize_title(&target) == home {
                        String::new()
                    } else {
                        target
                    };
                    builder.insert(&source, &target);
                }
                Ok(None) => {}
                Err(error) => contain_join_error(&self.counters, error),
            }
        }

        Ok(builder.freeze())
    }

    fn spawn_redirect(&self, tasks: &mut JoinSet<ResolvedRedirect>, page: PageListing) {
        let client = Arc::clone(&self.client);
        let counters = Arc::clone(&self.counters);

        tasks.spawn(async move {
            let label = format!("redirect {}", page.title);
            contain(&label, &counters, async {
                tracing::debug!("Resolving redirect {}", page.title);
                let links = client.page_links(page.page_id).await?;
                let target = links.links.into_iter().next().ok_or_else(|| {
                    MirrorError::MalformedResponse(format!("redirect {} has no target", links.title))
                })?;
                tracing::debug!("Resolved redirect {} -> {}", links.title, target.title);
                Ok((links.title, target.title))
            })
            .await
        });
    }

    /// Renders the stylesheet, the favicon and every content page with its images
    ///
    /// Page tasks hand the images they reference back to this loop, which
    /// spawns one download per distinct image into the same task set.
    ///
    /// # Errors
    ///
    /// Only enumeration failures are returned; page and image failures are contained.
    pub async fn render_content(&self, redirects: Arc<RedirectTable>) -> Result<()> {
        let rewriter = LinkRewriter::new(self.client.base_url().as_str(), redirects);
        let mut tasks: JoinSet<Vec<String>> = JoinSet::new();
        let mut seen_images: HashSet<String> = HashSet::new();

        self.spawn_stylesheet(&mut tasks);
        self.spawn_favicon(&mut tasks);

        for &namespace in &self.config.wiki.namespaces {
            let mut listing = pin!(self.client.list_pages(namespace, false)?);
            loop {
                tokio::select! {
                    next = listing.next() => match next {
                        Some(page) => self.spawn_page(&mut tasks, page?, &rewriter),
                        None => break,
                    },
                    Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                        self.collect_images(joined, &mut tasks, &mut seen_images);
                    }
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            self.collect_images(joined, &mut tasks, &mut seen_images);
        }

        tracing::info!("Mirrored {} distinct images", seen_images.len());
        Ok(())
    }

    fn spawn_page(&self, tasks: &mut JoinSet<Vec<String>>, page: PageListing, rewriter: &LinkRewriter) {
        let client = Arc::clone(&self.client);
        let counters = Arc::clone(&self.counters);
        let output_dir = Arc::clone(&self.output_dir);
        let rewriter = rewriter.clone();
        let mirrored_at = self.mirrored_at;

        tasks.spawn(async move {
            let label = format!("page {}", page.title);
            contain(&label, &counters, async {
                tracing::debug!("Rendering {}", page.title);
                let info = client.page_info(page.page_id).await?;
                let body = client.get_rendered_page(page.page_id).await?;
                let rendered = render_page(&body, &info, &rewriter, mirrored_at)?;
                write_page(&output_dir, &rendered).await?;
                counters.page_processed();
                tracing::debug!("Rendered {} -> {}", page.title, rendered.path);
                Ok(rendered.images)
            })
            .await
            .unwrap_or_default()
        });
    }

    fn spawn_image(&self, tasks: &mut JoinSet<Vec<String>>, src: String) {
        let client = Arc::clone(&self.client);
        let counters = Arc::clone(&self.counters);
        let output_dir = Arc::clone(&self.output_dir);
        let max_dimension = self.config.crawler.max_image_dimension;

        tasks.spawn(async move {
            let label = format!("image {}", src);
            contain(&label, &counters, async {
                let path = mirror_image(&client, &src, &output_dir, max_dimension).await?;
                tracing::trace!("Mirrored image {}", path.display());
                Ok(())
            })
            .await;
            Vec::new()
        });
    }

    fn spawn_stylesheet(&self, tasks: &mut JoinSet<Vec<String>>) {
        let client = Arc::clone(&self.client);
        let counters = Arc::clone(&self.counters);
        let target = output_path(&self.output_dir, STYLESHEET_PATH);
        let modules = self.config.wiki.stylesheet_modules.clone();
        let language = self.config.wiki.language.clone();

        tasks.spawn(async move {
            contain("stylesheet", &counters, async {
                let css = fetch_stylesheet(&client, &modules, &language).await?;
                tokio::fs::write(&target, css).await?;
                tracing::debug!("Wrote {}", target.display());
                Ok(())
            })
            .await;
            Vec::new()
        });
    }

    fn spawn_favicon(&self, tasks: &mut JoinSet<Vec<String>>) {
        let client = Arc::clone(&self.client);
        let counters = Arc::clone(&self.counters);
        let target = output_path(&self.output_dir, FAVICON_PATH);

        tasks.spawn(async move {
            contain("favicon", &counters, async {
                let bytes = client.raw_get(FAVICON_PATH, &[]).await?;
                tokio::fs::write(&target, bytes).await?;
                tracing::debug!("Wrote {}", target.display());
                Ok(())
            })
            .await;
            Vec::new()
        });
    }

    /// Handles a finished task, spawning downloads for images not seen before
    fn collect_images(
        &self,
        joined: std::result::Result<Vec<String>, JoinError>,
        tasks: &mut JoinSet<Vec<String>>,
        seen_images: &mut HashSet<String>,
    ) {
        match joined {
            Ok(images) => {
                for src in images {
                    if seen_images.insert(normalize_image_url(&src)) {
                        self.spawn_image(tasks, src);
                    }
                }
            }
            Err(error) => contain_join_error(&self.counters, error),
        }
    }

    /// Moves the rendered home page to `index.html`
    pub async fn finalize(&self) -> Result<()> {
        let home = normalize_title(&self.config.wiki.home_page);
        if move_home_to_index(&self.output_dir, &home).await? {
            tracing::info!("Moved {} to index.html", home);
        }
        Ok(())
    }
}

/// Runs a complete mirror operation
///
/// # Arguments
///
/// * `config` - The validated configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - The run completed; the verdict may still be a failure
/// * `Err(MirrorError)` - Setup or enumeration failed
pub async fn run_mirror(config: Config) -> Result<RunSummary> {
    let coordinator = Coordinator::setup(config).await?;
    coordinator.run().await
}
