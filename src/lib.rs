#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod expr;
pub mod geom;
pub mod space;

use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

use expr::{ExpressionError, MevalExpression};
use geom::{FieldMeshDiagnostics, HeightFieldOptions, IsosurfaceOptions, SurfaceData};
use space::{MathSpace, SpaceError, SpaceKind};

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {}

#[macro_export]
macro_rules! debug_log {
    ($($t:tt)*) => {{
        #[cfg(feature = "debug_logs")]
        {
            #[cfg(target_arch = "wasm32")]
            {
                ::web_sys::console::log_1(&::wasm_bindgen::JsValue::from_str(&format!($($t)*)));
            }
            #[cfg(not(target_arch = "wasm32"))]
            {
                println!("{}", format!($($t)*));
            }
        }
    }};
}

/// Failure at the engine boundary. Sampling itself never fails; only parsing,
/// space lookup and option decoding can.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Expression(#[from] ExpressionError),
    #[error(transparent)]
    Space(#[from] SpaceError),
    #[error("invalid options: {0}")]
    Options(String),
}

#[derive(Serialize)]
struct SurfaceExport<'a> {
    #[serde(flatten)]
    surface: &'a SurfaceData,
    diagnostics: &'a FieldMeshDiagnostics,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SpaceExport {
    name: &'static str,
    dimensions: [&'static str; 3],
    default_bounds: [geom::AxisRange; 3],
}

/// Public entry point for consumers.
#[wasm_bindgen]
pub struct Engine {
    initialized: bool,
    last_diagnostics: Option<FieldMeshDiagnostics>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl Engine {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Engine {
        Engine {
            initialized: true,
            last_diagnostics: None,
        }
    }

    #[wasm_bindgen]
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Samples `expression` as a height field over the named space.
    ///
    /// `expression` may be `real; imaginary` for complex-valued fields.
    /// `options` may be `undefined` or a partial `HeightFieldOptions` object.
    #[wasm_bindgen(js_name = heightField)]
    pub fn height_field(
        &mut self,
        expression: &str,
        space: &str,
        options: JsValue,
    ) -> Result<JsValue, JsValue> {
        let options: HeightFieldOptions = decode_options(options).map_err(to_js_error)?;
        let surface = self
            .build_height_field(expression, space, &options)
            .map_err(to_js_error)?;
        self.export(&surface)
    }

    /// Extracts the isosurface of `expression` over `x, y, z`.
    #[wasm_bindgen(js_name = isosurface)]
    pub fn isosurface(&mut self, expression: &str, options: JsValue) -> Result<JsValue, JsValue> {
        let options: IsosurfaceOptions = decode_options(options).map_err(to_js_error)?;
        let surface = self
            .build_isosurface(expression, &options)
            .map_err(to_js_error)?;
        self.export(&surface)
    }

    /// Lists the built-in coordinate spaces with their dimension names.
    #[wasm_bindgen(js_name = spaces)]
    pub fn spaces(&self) -> Result<JsValue, JsValue> {
        let spaces: Vec<SpaceExport> = SpaceKind::ALL
            .iter()
            .map(|kind| SpaceExport {
                name: kind.name(),
                dimensions: kind.dimensions(),
                default_bounds: kind.default_bounds(),
            })
            .collect();
        serde_wasm_bindgen::to_value(&spaces).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl Engine {
    /// Native form of [`Engine::height_field`].
    pub fn build_height_field(
        &mut self,
        expression: &str,
        space: &str,
        options: &HeightFieldOptions,
    ) -> Result<SurfaceData, EngineError> {
        let space = SpaceKind::from_name(space)?;
        let expression = MevalExpression::parse_field(expression)?;
        debug_log!(
            "heightField `{}` over {space} at R={}",
            expression.source(),
            options.resolution
        );
        let (surface, diagnostics) = geom::evaluate_height_field(&expression, &space, options);
        self.last_diagnostics = Some(diagnostics);
        Ok(surface)
    }

    /// Native form of [`Engine::isosurface`].
    pub fn build_isosurface(
        &mut self,
        expression: &str,
        options: &IsosurfaceOptions,
    ) -> Result<SurfaceData, EngineError> {
        let expression = MevalExpression::parse(expression)?;
        debug_log!(
            "isosurface `{}` at R={}, iso={}",
            expression.source(),
            options.resolution,
            options.isovalue
        );
        let (surface, diagnostics) = geom::extract_isosurface(&expression, options);
        self.last_diagnostics = Some(diagnostics);
        Ok(surface)
    }

    /// Diagnostics of the most recent successful build.
    #[must_use]
    pub fn last_diagnostics(&self) -> Option<&FieldMeshDiagnostics> {
        self.last_diagnostics.as_ref()
    }

    fn export(&self, surface: &SurfaceData) -> Result<JsValue, JsValue> {
        let default_diagnostics = FieldMeshDiagnostics::default();
        let export = SurfaceExport {
            surface,
            diagnostics: self.last_diagnostics.as_ref().unwrap_or(&default_diagnostics),
        };
        serde_wasm_bindgen::to_value(&export).map_err(|err| JsError::new(&err.to_string()).into())
    }
}

fn decode_options<T>(options: JsValue) -> Result<T, EngineError>
where
    T: Default + serde::de::DeserializeOwned,
{
    if options.is_undefined() || options.is_null() {
        return Ok(T::default());
    }
    serde_wasm_bindgen::from_value(options).map_err(|err| EngineError::Options(err.to_string()))
}

fn to_js_error<E: std::fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
