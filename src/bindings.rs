//! JavaScript host bindings.
//!
//! `RigSession` wraps a [`RigDriver`] for the browser. Scene lookups are
//! asynchronous on the host, so `attachScene` returns a promise; frames pushed
//! before it settles are skipped.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{future_to_promise, JsFuture};

use crate::config::{CameraGeometry, Config, ScenePaths};
use crate::driver::RigDriver;
use crate::error::RigError;
use crate::joint::NodeTransform;
use crate::scene::{NodeHandle, SceneStore};
use crate::tracking::{BodyFrame, DEFAULT_FRAME_MS};

impl From<RigError> for JsValue {
    fn from(err: RigError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Install the console logger and panic hook. Safe to call more than once.
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging() {
    let level = {
        cfg_if::cfg_if! {
            if #[cfg(debug_assertions)] {
                log::Level::Debug
            } else {
                log::Level::Info
            }
        }
    };
    console_error_panic_hook::set_once();
    console_log::init_with_level(level).ok();
}

fn now_ms() -> Option<f64> {
    web_sys::window()
        .and_then(|window| window.performance())
        .map(|perf| perf.now())
}

/// Host scene nodes, looked up ahead of time by name or path pattern.
#[derive(Default)]
struct JsScene {
    nodes: Vec<JsValue>,
    lookups: HashMap<String, Vec<NodeHandle>>,
}

impl JsScene {
    fn insert(&mut self, key: &str, found: Vec<JsValue>) {
        let handles = found
            .into_iter()
            .map(|node| {
                self.nodes.push(node);
                NodeHandle(self.nodes.len() as u32 - 1)
            })
            .collect();
        self.lookups.insert(key.to_string(), handles);
    }

    fn node(&self, handle: NodeHandle) -> Option<&JsValue> {
        self.nodes.get(handle.0 as usize)
    }
}

/// Call `scene[method](arg)` and await the result, whether or not it is a promise
async fn host_lookup(scene: &JsValue, method: &str, arg: &str) -> Result<JsValue, JsValue> {
    let func: Function = Reflect::get(scene, &JsValue::from_str(method))?.dyn_into()?;
    let result = func.call1(scene, &JsValue::from_str(arg))?;
    JsFuture::from(Promise::resolve(&result)).await
}

fn lookup_results(value: JsValue) -> Vec<JsValue> {
    if value.is_null() || value.is_undefined() {
        Vec::new()
    } else if Array::is_array(&value) {
        Array::from(&value).iter().collect()
    } else {
        vec![value]
    }
}

impl JsScene {
    async fn fetch(scene: JsValue, paths: ScenePaths) -> Result<Self, JsValue> {
        let mut mirror = JsScene::default();
        let anchor = host_lookup(&scene, "findFirst", &paths.anchor).await?;
        mirror.insert(&paths.anchor, lookup_results(anchor));
        for pattern in [&paths.joints, &paths.meshes] {
            let found = host_lookup(&scene, "findByPath", pattern).await?;
            mirror.insert(pattern, lookup_results(found));
        }
        Ok(mirror)
    }
}

fn set_number(target: &JsValue, key: &str, value: f32) -> Result<bool, JsValue> {
    let value = JsValue::from_f64(value as f64);
    Reflect::set(target, &JsValue::from_str(key), &value)
}

fn write_transform(node: &JsValue, transform: &NodeTransform) -> Result<(), JsValue> {
    let key = JsValue::from_str("transform");
    let mut target = Reflect::get(node, &key)?;
    if !target.is_object() {
        target = Object::new().into();
        Reflect::set(node, &key, &target)?;
    }
    set_number(&target, "x", transform.position.x)?;
    set_number(&target, "y", transform.position.y)?;
    set_number(&target, "rotationZ", transform.rotation_z)?;
    set_number(&target, "scaleX", transform.scale.x)?;
    set_number(&target, "scaleY", transform.scale.y)?;
    set_number(&target, "scaleZ", transform.scale.z)?;
    Ok(())
}

impl SceneStore for JsScene {
    fn find_first(&self, name: &str) -> Option<NodeHandle> {
        self.lookups.get(name).and_then(|found| found.first().copied())
    }

    fn find_by_path(&self, pattern: &str) -> Vec<NodeHandle> {
        self.lookups.get(pattern).cloned().unwrap_or_default()
    }

    fn set_transform(&mut self, node: NodeHandle, transform: &NodeTransform) {
        if let Some(target) = self.node(node) {
            if let Err(err) = write_transform(target, transform) {
                log::warn!("Failed to write transform to node {}: {:?}", node.0, err);
            }
        }
    }

    fn set_hidden(&mut self, node: NodeHandle, hidden: bool) {
        if let Some(target) = self.node(node) {
            let key = JsValue::from_str("hidden");
            if let Err(err) = Reflect::set(target, &key, &JsValue::from_bool(hidden)) {
                log::warn!("Failed to set hidden on node {}: {:?}", node.0, err);
            }
        }
    }
}

struct SessionState {
    driver: RigDriver,
    scene: Option<JsScene>,
    last_timestamp: Option<f64>,
}

/// Body rig session exported to JavaScript.
#[wasm_bindgen]
pub struct RigSession {
    state: Rc<RefCell<SessionState>>,
}

#[wasm_bindgen]
impl RigSession {
    /// `config` may be undefined to use the bundled defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        preview_width: f32,
        preview_height: f32,
        screen_scale: f32,
        config: JsValue,
    ) -> Result<RigSession, JsValue> {
        init_logging();

        let config = if config.is_undefined() || config.is_null() {
            Config::bundled()?
        } else {
            serde_wasm_bindgen::from_value::<Config>(config).map_err(|e| {
                JsValue::from_str(&format!("Failed to parse rig config: {}", e))
            })?
        };
        let camera = CameraGeometry::from_preview(preview_width, preview_height, screen_scale)?;
        let driver = RigDriver::new(&config, camera)?;
        log::info!(
            "Rig session created for {}x{} camera",
            camera.width,
            camera.height
        );

        Ok(RigSession {
            state: Rc::new(RefCell::new(SessionState {
                driver,
                scene: None,
                last_timestamp: None,
            })),
        })
    }

    /// Resolve the rig in the host scene. Rejects if any node is missing.
    ///
    /// `scene` must expose `findFirst(name)` and `findByPath(pattern)`,
    /// returning nodes or promises of nodes.
    #[wasm_bindgen(js_name = attachScene)]
    pub fn attach_scene(&self, scene: JsValue) -> Promise {
        let state = Rc::clone(&self.state);
        future_to_promise(async move {
            let paths = state.borrow().driver.scene_paths().clone();
            let mut mirror = JsScene::fetch(scene, paths).await?;

            let mut guard = state.borrow_mut();
            let session = &mut *guard;
            if let Err(err) = session.driver.attach(&mut mirror) {
                log::error!("Rig scene resolution failed: {}", err);
                return Err(err.into());
            }
            session.scene = Some(mirror);
            Ok(JsValue::TRUE)
        })
    }

    #[wasm_bindgen(getter, js_name = isAttached)]
    pub fn is_attached(&self) -> bool {
        self.state.borrow().driver.is_attached()
    }

    /// Evaluate one frame of tracking data.
    ///
    /// `coords` holds 16 normalized (x, y) pairs. Without `delta_ms` the elapsed
    /// time is measured with `performance.now()`. Returns false while the
    /// scene is still being resolved.
    #[wasm_bindgen(js_name = pushFrame)]
    pub fn push_frame(
        &self,
        coords: &[f32],
        tracked_count: u32,
        delta_ms: Option<f32>,
    ) -> Result<bool, JsValue> {
        let mut guard = self.state.borrow_mut();
        let session = &mut *guard;

        let delta_ms = match delta_ms {
            Some(delta) => delta,
            None => {
                let now = now_ms();
                let delta = match (now, session.last_timestamp) {
                    (Some(now), Some(last)) => (now - last) as f32,
                    _ => DEFAULT_FRAME_MS,
                };
                session.last_timestamp = now;
                delta
            }
        };

        let frame = BodyFrame::from_flat(coords, tracked_count, delta_ms).ok_or_else(|| {
            JsValue::from_str(&format!(
                "expected {} keypoint coordinates, got {}",
                BodyFrame::FLAT_LEN,
                coords.len()
            ))
        })?;

        let updated = match session.scene.as_mut() {
            Some(scene) => session.driver.update(scene, &frame).is_some(),
            // Not attached yet: the driver counts the skip and writes nothing
            None => session.driver.update(&mut JsScene::default(), &frame).is_some(),
        };
        Ok(updated)
    }

    /// Last evaluated joint transforms, 6 floats per joint in scene order:
    /// x, y, rotationZ, scaleX, scaleY, scaleZ.
    #[wasm_bindgen(js_name = jointTransforms)]
    pub fn joint_transforms(&self) -> Vec<f32> {
        let state = self.state.borrow();
        state
            .driver
            .last_frame()
            .map(|frame| bytemuck::cast_slice(&frame.pose.packed()).to_vec())
            .unwrap_or_default()
    }

    /// Last evaluated glasses transform in the same layout
    #[wasm_bindgen(js_name = glassesTransform)]
    pub fn glasses_transform(&self) -> Vec<f32> {
        let state = self.state.borrow();
        state
            .driver
            .last_frame()
            .map(|frame| {
                let packed = [frame.glasses.to_packed()];
                bytemuck::cast_slice(&packed).to_vec()
            })
            .unwrap_or_default()
    }

    /// Last evaluated hidden flags, one byte per mesh in scene order
    #[wasm_bindgen(js_name = meshHidden)]
    pub fn mesh_hidden(&self) -> Vec<u8> {
        let state = self.state.borrow();
        state
            .driver
            .last_frame()
            .map(|frame| frame.visibility.to_bytes().to_vec())
            .unwrap_or_default()
    }

    #[wasm_bindgen(getter, js_name = headDistance)]
    pub fn head_distance(&self) -> f32 {
        let state = self.state.borrow();
        state.driver.last_frame().map_or(0.0, |frame| frame.signals.head_distance)
    }
}
