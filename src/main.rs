use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use glam::{Mat4, Vec3};
use log::{error, info};

use umbra::io::common::loader::RawAssetLoader;
use umbra::io::fs::loader::FsLoader;
use umbra::rendering::gpu::context::GpuContext;
use umbra::rendering::gpu::headless::HeadlessDevice;
use umbra::rendering::loader::load_model;
use umbra::settings::CliArgs;
use umbra::util::thread_pool::ThreadPool;

fn main() {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    if let Err(err) = run(&args) {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> anyhow::Result<()> {
    let pool = match args.threads {
        Some(threads) => ThreadPool::new(threads),
        None => ThreadPool::with_available_parallelism(),
    }
    .context("Starting the loader threads")?;

    let device = Arc::new(HeadlessDevice::new());
    let context = GpuContext::new(device.clone());
    let loader: Arc<dyn RawAssetLoader> = Arc::new(FsLoader::new(args.asset_dir.clone()));

    let mut model = load_model(&pool, &loader, &context, &args.model)?;
    let stats = model.stats();
    info!(
        "Loaded {}: {} objects, {} meshes, {} vertices, {} elements, {} nodes, {} textures",
        args.model.display(),
        stats.objects,
        stats.meshes,
        stats.vertices,
        stats.elements,
        stats.nodes,
        stats.textures
    );
    if let Some(bounds) = stats.bounds {
        info!("Mesh space bounds {} to {}", bounds.min, bounds.max);
    }

    let global = Mat4::from_translation(Vec3::from(args.translation));
    let mut draw_calls = 0;
    for _ in 0..args.frames {
        profiling::finish_frame!();
        draw_calls += model.render(global);
    }

    let device_stats = device.stats();
    info!(
        "{} frames, {} draw calls, {} texture binds, {} buffer bytes on the device",
        args.frames, draw_calls, device_stats.texture_binds, device_stats.buffer_bytes
    );
    Ok(())
}
