use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread::ThreadId;

use dashmap::DashMap;
use log::{error, trace};

use crate::rendering::gpu::{
    BufferHandle, DrawCall, GpuDevice, TextureHandle, VertexArrayHandle, VertexAttribute,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VertexArrayState {
    pub attributes: Vec<(BufferHandle, VertexAttribute)>,
    pub index_buffer: Option<BufferHandle>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeviceStats {
    pub vertex_arrays: usize,
    pub buffers: usize,
    pub buffer_bytes: usize,
    pub textures: usize,
    pub texture_binds: usize,
    pub draw_calls: usize,
    /// Calls made while the context was not bound to the calling thread.
    pub context_violations: usize,
}

/// A device without a window that hands out handles and records what it is asked to do.
#[derive(Default)]
pub struct HeadlessDevice {
    next_handle: AtomicU32,
    current_thread: Mutex<Option<ThreadId>>,
    vertex_arrays: DashMap<VertexArrayHandle, VertexArrayState>,
    buffers: DashMap<BufferHandle, usize>,
    textures: DashMap<TextureHandle, (u32, u32)>,
    bound_textures: DashMap<u32, TextureHandle>,
    texture_binds: AtomicUsize,
    draw_calls: Mutex<Vec<DrawCall>>,
    context_violations: AtomicUsize,
}

impl HeadlessDevice {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handle(&self) -> u32 {
        // 0 is never a valid name, like in GL
        self.next_handle.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn check_current(&self, call: &str) {
        let current = *self.current_thread.lock().unwrap_or_else(PoisonError::into_inner);
        if current != Some(std::thread::current().id()) {
            error!("{} called without the context being current on this thread", call);
            self.context_violations.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn stats(&self) -> DeviceStats {
        DeviceStats {
            vertex_arrays: self.vertex_arrays.len(),
            buffers: self.buffers.len(),
            buffer_bytes: self.buffers.iter().map(|entry| *entry.value()).sum(),
            textures: self.textures.len(),
            texture_binds: self.texture_binds.load(Ordering::Relaxed),
            draw_calls: self.draw_calls.lock().unwrap_or_else(PoisonError::into_inner).len(),
            context_violations: self.context_violations.load(Ordering::Relaxed),
        }
    }

    pub fn vertex_array(&self, vertex_array: VertexArrayHandle) -> Option<VertexArrayState> {
        self.vertex_arrays.get(&vertex_array).map(|state| state.clone())
    }

    pub fn texture_size(&self, texture: TextureHandle) -> Option<(u32, u32)> {
        self.textures.get(&texture).map(|size| *size)
    }

    pub fn bound_texture(&self, unit: u32) -> Option<TextureHandle> {
        self.bound_textures.get(&unit).map(|texture| *texture)
    }

    /// Takes the draw calls recorded so far.
    pub fn take_draw_calls(&self) -> Vec<DrawCall> {
        std::mem::take(&mut *self.draw_calls.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl GpuDevice for HeadlessDevice {
    fn make_current(&self) {
        let mut current = self.current_thread.lock().unwrap_or_else(PoisonError::into_inner);
        if current.is_some() {
            error!("Context made current while it is still bound to a thread");
            self.context_violations.fetch_add(1, Ordering::Relaxed);
        }
        *current = Some(std::thread::current().id());
    }

    fn release_current(&self) {
        *self.current_thread.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn create_vertex_array(&self) -> VertexArrayHandle {
        self.check_current("create_vertex_array");
        let handle = VertexArrayHandle(self.next_handle());
        self.vertex_arrays.insert(handle, VertexArrayState::default());
        handle
    }

    fn create_buffer(&self, data: &[u8]) -> BufferHandle {
        self.check_current("create_buffer");
        let handle = BufferHandle(self.next_handle());
        trace!("Uploading {} bytes into {:?}", data.len(), handle);
        self.buffers.insert(handle, data.len());
        handle
    }

    fn set_vertex_attribute(&self, vertex_array: VertexArrayHandle, buffer: BufferHandle, attribute: &VertexAttribute) {
        self.check_current("set_vertex_attribute");
        match self.vertex_arrays.get_mut(&vertex_array) {
            Some(mut state) => state.attributes.push((buffer, *attribute)),
            None => error!("Attribute set on unknown {:?}", vertex_array),
        }
    }

    fn set_index_buffer(&self, vertex_array: VertexArrayHandle, buffer: BufferHandle) {
        self.check_current("set_index_buffer");
        match self.vertex_arrays.get_mut(&vertex_array) {
            Some(mut state) => state.index_buffer = Some(buffer),
            None => error!("Index buffer set on unknown {:?}", vertex_array),
        }
    }

    fn create_texture(&self, width: u32, height: u32, rgba: &[u8]) -> TextureHandle {
        self.check_current("create_texture");
        let handle = TextureHandle(self.next_handle());
        trace!("Uploading {}x{} texture ({} bytes) into {:?}", width, height, rgba.len(), handle);
        self.textures.insert(handle, (width, height));
        handle
    }

    fn bind_texture(&self, unit: u32, texture: TextureHandle) {
        self.check_current("bind_texture");
        self.texture_binds.fetch_add(1, Ordering::Relaxed);
        self.bound_textures.insert(unit, texture);
    }

    fn draw(&self, call: &DrawCall) {
        self.check_current("draw");
        self.draw_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(*call);
    }

    fn delete_vertex_array(&self, vertex_array: VertexArrayHandle) {
        self.check_current("delete_vertex_array");
        self.vertex_arrays.remove(&vertex_array);
    }

    fn delete_buffer(&self, buffer: BufferHandle) {
        self.check_current("delete_buffer");
        self.buffers.remove(&buffer);
    }

    fn delete_texture(&self, texture: TextureHandle) {
        self.check_current("delete_texture");
        self.textures.remove(&texture);
        self.bound_textures.retain(|_, bound| *bound != texture);
    }
}
