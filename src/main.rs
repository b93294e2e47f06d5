use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use lightbox::gesture::{GestureSample, TapPoint};
use lightbox::resolve::{FileResolver, ResolveQueue, Resolved, DEFAULT_WORKERS};
use lightbox::scanner::{scan_directory, ScanConfig};
use lightbox::{MediaItem, PagerCommands, Size, ViewerConfig, ViewerHost, ViewerShell};

/// Pages around the current one whose dimensions are fetched ahead of time.
const PREFETCH_RADIUS: usize = 2;

const DEFAULT_VIEWPORT: Size = Size::new(390.0, 844.0);

const FRAME: Duration = Duration::from_millis(16);

#[derive(Debug, Default)]
struct LogPager {
    offset: f64,
    enabled: bool,
}

impl PagerCommands for LogPager {
    fn scroll_to_offset(&mut self, offset: f64, animated: bool) {
        debug!(offset, animated, "Pager scroll");
        self.offset = offset;
    }

    fn set_scroll_enabled(&mut self, enabled: bool) {
        debug!(enabled, "Pager scroll enabled");
        self.enabled = enabled;
    }
}

#[derive(Debug, Default)]
struct LogHost {
    closed: bool,
}

impl ViewerHost for LogHost {
    fn on_current_index_change(&mut self, index: usize) {
        info!(index, "Current index changed");
    }

    fn on_request_close(&mut self) {
        info!("Viewer closed");
        self.closed = true;
    }

    fn on_index_will_change(&mut self, index: usize) {
        debug!(index, "Index will change");
    }

    fn on_chrome_visibility(&mut self, visible: bool) {
        debug!(visible, "Chrome visibility");
    }

    fn on_zoom_to(&mut self, index: usize, scale: f64, at: TapPoint) {
        info!(index, scale, x = at.x, y = at.y, "Zoom to");
    }

    fn on_long_press(&mut self, item: &MediaItem) {
        info!(source = ?item.source, "Long press");
    }
}

type Shell = ViewerShell<LogPager, LogHost>;

fn parse_size(s: &str) -> Option<Size> {
    let (w, h) = s.trim().split_once(['x', 'X'])?;
    let size = Size::new(w.trim().parse().ok()?, h.trim().parse().ok()?);
    size.is_positive().then_some(size)
}

fn viewport_from_env() -> Size {
    std::env::var("LIGHTBOX_VIEWPORT")
        .ok()
        .and_then(|v| parse_size(&v))
        .unwrap_or(DEFAULT_VIEWPORT)
}

fn prefetch(shell: &Shell, queue: &ResolveQueue) {
    let current = shell.current_index();
    let start = current.saturating_sub(PREFETCH_RADIUS);
    let end = current + PREFETCH_RADIUS + 1;
    let queued = queue.request_window(shell.items(), start..end);
    if queued > 0 {
        debug!(queued, "Queued dimension lookups");
    }
}

/// Stands in for the platform renderer: a successful probe counts as loaded,
/// a failed one as a load error.
fn apply_resolved(shell: &mut Shell, resolved: Resolved) {
    let index = resolved.index;
    let failure = resolved.result.as_ref().err().map(|e| e.to_string());
    shell.apply_resolved(resolved);
    match failure {
        None => shell.on_media_loaded(index),
        Some(message) => shell.on_media_error(index, &message),
    }
}

fn apply_results(shell: &mut Shell, queue: &ResolveQueue) {
    for resolved in queue.drain() {
        apply_resolved(shell, resolved);
    }
}

fn print_status(shell: &Shell, now: Duration) {
    let index = shell.current_index();
    let Some(item) = shell.item(index) else {
        println!("(empty)");
        return;
    };
    let Some(frame) = shell.frame(index, now) else {
        return;
    };
    println!(
        "[{}/{}] {} {:?}",
        index + 1,
        shell.items().len(),
        item.source.display(),
        item.kind
    );
    println!(
        "  scale {:.4} translate ({:.1}, {:.1}) max_zoom {:.2}",
        frame.transform.scale,
        frame.transform.translate_x,
        frame.transform.translate_y,
        frame.max_zoom
    );
    println!(
        "  zoomed {} ({:.2}) placeholder {} playing {} opacity {:.2} chrome {} paging {}",
        frame.zoom.is_zoomed,
        frame.zoom.zoom_scale,
        frame.show_placeholder,
        frame.playing,
        frame.opacity,
        shell.chrome_visible(),
        shell.pager().enabled
    );
    if frame.flags.favorite || !frame.flags.albums.is_empty() {
        println!(
            "  favorite {} albums {:?}",
            frame.flags.favorite, frame.flags.albums
        );
    }
}

fn print_help() {
    println!("commands:");
    println!("  next | prev        swipe one page");
    println!("  seek N             jump to page N");
    println!("  tap [X Y]          single tap");
    println!("  dtap [X Y]         double tap");
    println!("  pinch S            pinch to scale S and release");
    println!("  flick V            vertical flick with velocity V");
    println!("  rotate WxH         change the viewport");
    println!("  hold               long press");
    println!("  close              close the viewer");
    println!("  status | help | quit");
}

fn tap_point(args: &[&str], viewport: Size) -> TapPoint {
    match args {
        [x, y, ..] => TapPoint::new(x.parse().unwrap_or(0.0), y.parse().unwrap_or(0.0)),
        _ => TapPoint::new(viewport.width / 2.0, viewport.height / 2.0),
    }
}

/// Returns false when the session should end.
fn run_command(shell: &mut Shell, line: &str, now: Duration) -> Result<bool> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let Some((cmd, args)) = words.split_first() else {
        return Ok(true);
    };
    let current = shell.current_index();

    match *cmd {
        "next" | "prev" => {
            let forward = *cmd == "next";
            let target = if forward {
                current + 1
            } else {
                current.saturating_sub(1)
            };
            shell.on_pager_scroll(if forward { 1.0 } else { -1.0 });
            let offset = target as f64 * shell.viewport().width;
            shell.on_pager_settle(offset);
        }
        "seek" => {
            let index: usize = args
                .first()
                .context("seek needs an index")?
                .parse()
                .context("Invalid index")?;
            shell.handle().set_current_index(index);
        }
        "tap" => {
            let at = tap_point(args, shell.viewport());
            shell.on_tap(current, now, at);
        }
        "dtap" => {
            let at = tap_point(args, shell.viewport());
            shell.on_tap(current, now, at);
            shell.on_tap(current, now + Duration::from_millis(120), at);
        }
        "pinch" => {
            let scale: f64 = args
                .first()
                .context("pinch needs a scale")?
                .parse()
                .context("Invalid scale")?;
            shell.on_item_scroll(current, GestureSample::new(0.0, 0.0, scale, now));
            shell.on_item_settle(current, GestureSample::new(0.0, 0.0, scale, now));
        }
        "flick" => {
            let velocity: f64 = args
                .first()
                .context("flick needs a velocity")?
                .parse()
                .context("Invalid velocity")?;
            let zoom = shell.zoom_state(current).zoom_scale;
            shell.on_item_scroll(current, GestureSample::new(velocity * 40.0, velocity, zoom, now));
            shell.on_item_settle(current, GestureSample::new(velocity * 40.0, velocity, zoom, now));
        }
        "rotate" => {
            let size = args
                .first()
                .and_then(|s| parse_size(s))
                .context("rotate needs WxH")?;
            shell.set_viewport(size);
        }
        "hold" => shell.on_long_press(current),
        "close" => shell.request_close(now),
        "status" => print_status(shell, now),
        "help" => print_help(),
        "quit" | "exit" => return Ok(false),
        other => bail!("Unknown command: {}", other),
    }
    Ok(true)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lightbox=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let dir = PathBuf::from(args.next().unwrap_or_else(|| ".".to_string()));
    let initial: usize = match args.next() {
        Some(s) => s.parse().context("Invalid start index")?,
        None => 0,
    };

    let items = scan_directory(&dir, &ScanConfig::default())?;
    if items.is_empty() {
        bail!("No media found in {:?}", dir);
    }

    let config = ViewerConfig::from_env();
    let viewport = viewport_from_env();
    info!(?viewport, ?config, "Starting lightbox");

    let queue = ResolveQueue::new(Arc::new(FileResolver), DEFAULT_WORKERS)?;
    let mut shell = ViewerShell::new(
        items,
        initial,
        viewport,
        config,
        LogPager::default(),
        LogHost::default(),
    );

    let clock = Instant::now();
    prefetch(&shell, &queue);
    thread::sleep(FRAME);
    apply_results(&mut shell, &queue);
    print_status(&shell, clock.elapsed());
    print_help();

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let now = clock.elapsed();

        match run_command(&mut shell, &line, now) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => println!("error: {:#}", e),
        }

        // Run the close fade to completion.
        while shell.is_closing() && !shell.host().closed {
            thread::sleep(FRAME);
            shell.tick(clock.elapsed());
        }
        if shell.host().closed {
            break;
        }

        prefetch(&shell, &queue);
        if let Some(resolved) = queue.recv_timeout(FRAME) {
            apply_resolved(&mut shell, resolved);
        }
        apply_results(&mut shell, &queue);
    }

    Ok(())
}
