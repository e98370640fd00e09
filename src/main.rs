// main.rs — 虚拟漫游桌面端:事件循环、异步图片解码与各模块的接线

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // 在 Release 模式下隐藏控制台窗口

mod camera;
mod config;
mod geometry;
mod hotspot;
mod i18n;
mod input;
mod renderer;
mod scene;
mod tour;
mod widgets;

use config::TourConfig;
use input::{InputDisambiguator, NavigationIntent, RotationAxis};
use renderer::Renderer;
use scene::LoadState;
use tour::{ClickAction, Tour};
use widgets::{FrameState, Marker, Widgets};

use winit::{
    dpi::LogicalSize,
    event::*,
    event_loop::{ControlFlow, EventLoop},
    window::{Fullscreen, WindowBuilder},
};

use image::io::Reader as ImageReader;
use image::RgbaImage;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread;

// 解码线程发回主循环的消息;全景图带代数,过期的结果会被丢弃
enum LoadedImage {
    Panorama { generation: u64, image: RgbaImage },
    PanoramaFailed { generation: u64, error: String },
    Photo { image: RgbaImage },
    PhotoFailed { error: String },
    PortalTexture { image: RgbaImage },
}

fn main() {
    env_logger::init();

    let Some(tour_path) = resolve_tour_path() else {
        log::error!("no tour file given; pass a path or pick one in the dialog");
        return;
    };

    let config = match TourConfig::from_file(&tour_path) {
        Ok(config) => config,
        Err(err) => {
            log::error!("{}: {err}", tour_path.display());
            return;
        }
    };

    i18n::init(i18n::resolve_lang(&config.lang));

    let event_loop = EventLoop::new();
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&i18n::tr("app.title"))
            .with_inner_size(LogicalSize::new(1280, 720))
            .build(&event_loop)
            .unwrap(),
    );

    let mut renderer = pollster::block_on(Renderer::new(window.clone()));
    let mut input = InputDisambiguator::new(config.enable_keyboard);
    let mut widgets = Widgets::new();
    let mut tour = Tour::new(config);

    let mut is_fullscreen = false;
    let mut cursor = (0.0f32, 0.0f32);

    // 异步加载通道
    let (tx, rx): (Sender<LoadedImage>, Receiver<LoadedImage>) = channel();

    if let Some(texture) = tour.config().portal_texture.clone() {
        start_load_portal_texture(tour.config().asset_path(&texture), tx.clone());
    }

    match tour.start() {
        Ok(request) => start_load_panorama(request.image, request.generation, tx.clone()),
        Err(err) => {
            log::error!("unable to start the tour: {err}");
            return;
        }
    }

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Poll;

        // 处理后台解码结果
        while let Ok(message) = rx.try_recv() {
            match message {
                LoadedImage::Panorama { generation, image } => {
                    let (w, h) = image.dimensions();
                    if tour.image_loaded(generation, w, h) {
                        renderer.load_panorama(image);
                    }
                }
                LoadedImage::PanoramaFailed { generation, error } => {
                    tour.image_failed(generation, &error);
                }
                LoadedImage::Photo { image } => {
                    // 用户可能在解码完成前已经关掉了查看器
                    if widgets.is_photo_visible() {
                        let texture = renderer.egui_ctx.load_texture(
                            "photo_inset",
                            color_image(&image),
                            egui::TextureOptions::LINEAR,
                        );
                        widgets.set_photo_texture(texture);
                    }
                }
                LoadedImage::PhotoFailed { error } => {
                    // 照片加载失败不致命:收起查看器,恢复导航
                    log::error!("{}: {error}", i18n::tr("scene.load_failed"));
                    widgets.hide_photo();
                    tour.close_photo();
                }
                LoadedImage::PortalTexture { image } => {
                    let texture = renderer.egui_ctx.load_texture(
                        "portal_marker",
                        color_image(&image),
                        egui::TextureOptions::LINEAR,
                    );
                    widgets.set_portal_texture(texture);
                }
            }
        }

        match event {
            Event::WindowEvent { event, .. } => {
                // 先让 egui 处理事件
                let response = renderer.egui_state.on_event(&renderer.egui_ctx, &event);
                if response.consumed {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        *control_flow = ControlFlow::Exit;
                    }

                    WindowEvent::Resized(new_size) => {
                        renderer.resize(new_size);
                    }

                    other => {
                        if let WindowEvent::CursorMoved { position, .. } = &other {
                            cursor = (position.x as f32, position.y as f32);
                        }
                        let intents = input.window_event(&other);
                        dispatch_intents(
                            intents,
                            &mut tour,
                            &mut widgets,
                            &renderer,
                            &window,
                            &tx,
                            &mut is_fullscreen,
                            control_flow,
                        );
                    }
                }
            }

            Event::RedrawRequested(_) => {
                let camera = tour.camera();
                let forward = camera.forward();
                let pitch = forward.y.clamp(-1.0, 1.0).asin();
                let yaw = (-forward.x).atan2(-forward.z);
                renderer.update_camera(yaw, pitch, camera.effective_fov_deg());

                let width = renderer.size.width as f32;
                let height = renderer.size.height as f32;
                let markers = build_markers(&tour, width, height);
                let hover_tooltip = hover_tooltip(&tour);

                let frame = FrameState {
                    loading: tour.load_state() == LoadState::Loading,
                    failed: tour.load_state() == LoadState::Failed,
                    scene_title: tour.scene_title().unwrap_or(""),
                    markers: &markers,
                    hover_tooltip: hover_tooltip.as_deref(),
                    cursor,
                    show_exit: tour.config().exit_url.is_some(),
                    is_fullscreen,
                };

                let mut ui_intents = Vec::new();
                let render_result = renderer.render_with_ui(&window, |ctx| {
                    ui_intents = widgets.draw(ctx, &frame);
                });

                dispatch_intents(
                    ui_intents,
                    &mut tour,
                    &mut widgets,
                    &renderer,
                    &window,
                    &tx,
                    &mut is_fullscreen,
                    control_flow,
                );

                match render_result {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => renderer.resize(renderer.size),
                    Err(wgpu::SurfaceError::OutOfMemory) => *control_flow = ControlFlow::Exit,
                    Err(e) => log::error!("render error: {e:?}"),
                }
            }

            Event::MainEventsCleared => {
                window.request_redraw();
            }

            _ => {}
        }
    });
}

// 第一个非 flag 参数是 tour 文件路径;没有就弹文件选择框
fn resolve_tour_path() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--lang" {
            let _ = args.next();
            continue;
        }
        if !arg.starts_with("--") {
            return Some(PathBuf::from(arg));
        }
    }

    rfd::FileDialog::new()
        .add_filter(&i18n::tr("file.filter.tours"), &["json"])
        .pick_file()
}

#[allow(clippy::too_many_arguments)]
fn dispatch_intents(
    intents: Vec<NavigationIntent>,
    tour: &mut Tour,
    widgets: &mut Widgets,
    renderer: &Renderer,
    window: &winit::window::Window,
    tx: &Sender<LoadedImage>,
    is_fullscreen: &mut bool,
    control_flow: &mut ControlFlow,
) {
    let width = renderer.size.width as f32;
    let height = renderer.size.height as f32;

    for intent in intents {
        match intent {
            NavigationIntent::Hover { x, y } => {
                tour.hover(x, y, width, height);
            }
            NavigationIntent::Activate { x, y } => match tour.click(x, y, width, height) {
                Ok(ClickAction::LoadScene(request)) => {
                    start_load_panorama(request.image, request.generation, tx.clone());
                }
                Ok(ClickAction::OpenPhoto { image, title }) => {
                    widgets.show_photo(title);
                    start_load_photo(image, tx.clone());
                }
                Ok(ClickAction::CloseOverlay) => {
                    widgets.hide_photo();
                }
                Ok(ClickAction::None) => {}
                Err(err) => {
                    // 配置指向不存在的场景:记录错误,停留在当前场景
                    log::error!("{err}");
                }
            },
            NavigationIntent::Zoom(delta) => {
                tour.zoom(delta);
            }
            NavigationIntent::Rotate { axis: RotationAxis::Pan, angle } => {
                tour.rotate_pan(angle);
            }
            NavigationIntent::Rotate { axis: RotationAxis::Tilt, angle } => {
                tour.rotate_tilt(angle);
            }
            NavigationIntent::CloseOverlay => {
                if widgets.is_photo_visible() {
                    widgets.hide_photo();
                    tour.close_photo();
                }
            }
            NavigationIntent::ToggleFullscreen => {
                *is_fullscreen = !*is_fullscreen;
                if *is_fullscreen {
                    window.set_fullscreen(Some(Fullscreen::Borderless(None)));
                } else {
                    window.set_fullscreen(None);
                }
            }
            NavigationIntent::ExitRequested => {
                *control_flow = ControlFlow::Exit;
            }
        }
    }
}

fn build_markers(tour: &Tour, width: f32, height: f32) -> Vec<Marker> {
    let camera = tour.camera();
    tour.registry()
        .all()
        .iter()
        .filter_map(|hotspot| {
            let (x, y) = camera.world_to_screen(hotspot.transform.position, width, height)?;
            Some(Marker {
                x,
                y,
                kind: hotspot.kind,
                hovered: hotspot.state == hotspot::HotspotState::Hovered,
            })
        })
        .collect()
}

// 悬停提示:informative tooltips 开启时显示目的地/照片标题,否则显示通用文案
fn hover_tooltip(tour: &Tour) -> Option<String> {
    let hotspot = tour.hovered().and_then(|id| tour.registry().get(id))?;
    let informative = tour.config().enable_informative_destination_tooltips;

    match hotspot.kind {
        hotspot::HotspotKind::Portal => {
            if informative {
                let dest_uid = tour
                    .config()
                    .scene(&hotspot.scene_uid)
                    .and_then(|s| s.transitions.get(hotspot.index))
                    .map(|t| t.to_uid.as_str())?;
                let title = tour
                    .config()
                    .scene(dest_uid)
                    .map(|s| s.title.as_str())
                    .filter(|t| !t.is_empty())
                    .unwrap_or(dest_uid);
                Some(title.to_string())
            } else {
                Some(i18n::tr("tooltip.portal"))
            }
        }
        hotspot::HotspotKind::Photo => {
            let title = tour
                .config()
                .scene(&hotspot.scene_uid)
                .and_then(|s| s.photos.get(hotspot.index))
                .map(|p| p.title.as_str())
                .filter(|t| !t.is_empty());
            match (informative, title) {
                (true, Some(title)) => Some(title.to_string()),
                _ => Some(i18n::tr("tooltip.photo")),
            }
        }
    }
}

fn color_image(img: &RgbaImage) -> egui::ColorImage {
    let (w, h) = img.dimensions();
    egui::ColorImage::from_rgba_unmultiplied([w as usize, h as usize], img.as_raw())
}

fn load_rgba(path: &str) -> Result<RgbaImage, image::ImageError> {
    let file = File::open(path).map_err(image::ImageError::IoError)?;
    let reader = BufReader::new(file);

    let img = ImageReader::new(reader)
        .with_guessed_format()
        .map_err(image::ImageError::IoError)
        .and_then(|mut r| {
            r.no_limits();
            r.decode()
        })?;

    Ok(img.to_rgba8())
}

fn start_load_panorama(path: String, generation: u64, tx: Sender<LoadedImage>) {
    thread::spawn(move || {
        log::info!("decoding panorama {path}");
        let message = match load_rgba(&path) {
            Ok(image) => LoadedImage::Panorama { generation, image },
            Err(err) => LoadedImage::PanoramaFailed { generation, error: err.to_string() },
        };
        let _ = tx.send(message);
    });
}

fn start_load_photo(path: String, tx: Sender<LoadedImage>) {
    thread::spawn(move || {
        log::info!("decoding photo {path}");
        let message = match load_rgba(&path) {
            Ok(image) => LoadedImage::Photo { image },
            Err(err) => LoadedImage::PhotoFailed { error: err.to_string() },
        };
        let _ = tx.send(message);
    });
}

fn start_load_portal_texture(path: String, tx: Sender<LoadedImage>) {
    thread::spawn(move || {
        match load_rgba(&path) {
            Ok(image) => {
                let _ = tx.send(LoadedImage::PortalTexture { image });
            }
            Err(err) => {
                // 没有贴图就退回画圆环,只记一条警告
                log::warn!("portal texture {path} failed to load: {err}");
            }
        }
    });
}
