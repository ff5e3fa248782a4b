#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("mesh_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use field_engine::Engine;
    use field_engine::geom::{
        AxisRange, ColorMode, FieldMeshDiagnostics, HeightFieldOptions, IsosurfaceOptions,
        SurfaceData, UndefinedCornerPolicy,
    };
    use field_engine::space::{MathSpace, SpaceKind};
    use std::fmt::Write as _;
    use std::fs::{self, File};
    use std::io::{BufWriter, Write};
    use std::path::{Path, PathBuf};

    const SNAPSHOT_QUANTIZE: f64 = 1e-6;
    const SNAPSHOT_DECIMALS: usize = 6;

    const USAGE: &str = r#"mesh_cli (field-engine)

USAGE:
  mesh_cli list
  mesh_cli height <expression> [options]
  mesh_cli implicit <expression> [options]

OPTIONS (height):
  --space <name>          cartesian | cylindrical | complex (default: cartesian)
  --resolution <n>        Grid cells per axis (default: 50)
  --color <mode>          height | domain | none (default: height)
  --bounds <min> <max>    Same range for both parameter axes

OPTIONS (implicit):
  --resolution <n>        Cubes per axis (default: 32)
  --iso <value>           Isovalue (default: 0)
  --bounds <min> <max>    Same range for x, y and z
  --policy <name>         outside | skip (default: outside)

OUTPUT:
  --obj <path>            Write OBJ
  --snap <path>           Write golden-style snapshot
  --overwrite             Allow overwriting existing files

EXPRESSIONS:
  Height fields over the complex plane accept `real; imaginary`.
  Implicit surfaces accept `lhs = rhs` as well as a plain field.
"#;

    const SAMPLE_FIELDS: [(&str, &str); 5] = [
        ("height", "sin(x) * cos(y)"),
        ("height --space cylindrical", "r"),
        ("height --space complex --color domain", "re^2 - im^2; 2*re*im"),
        ("implicit", "x^2 + y^2 + z^2 = 1"),
        ("implicit --bounds -1.2 1.2", "x^4 + y^4 + z^4 - x^2 - y^2 - z^2 + 0.4"),
    ];

    pub fn run() -> Result<(), String> {
        let mut args = Args::new(std::env::args().skip(1).collect());
        let Some(cmd) = args.next() else {
            print!("{USAGE}");
            return Ok(());
        };

        match cmd.as_str() {
            "-h" | "--help" | "help" => {
                print!("{USAGE}");
                Ok(())
            }
            "list" => {
                list();
                Ok(())
            }
            "height" => run_height(&mut args),
            "implicit" => run_implicit(&mut args),
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn list() {
        println!("spaces:");
        for kind in SpaceKind::ALL {
            let [a, b, c] = kind.dimensions();
            println!("  {:<12} ({a}, {b}) -> {c}", kind.name());
        }
        println!("\nsample fields:");
        for (command, expression) in SAMPLE_FIELDS {
            println!("  mesh_cli {command} \"{expression}\"");
        }
    }

    #[derive(Debug, Default)]
    struct OutputOptions {
        obj: Option<PathBuf>,
        snap: Option<PathBuf>,
        overwrite: bool,
    }

    impl OutputOptions {
        /// Consumes an output flag; returns `false` when `flag` is not one.
        fn accept(&mut self, flag: &str, args: &mut Args) -> Result<bool, String> {
            match flag {
                "--obj" => self.obj = Some(PathBuf::from(args.value(flag)?)),
                "--snap" => self.snap = Some(PathBuf::from(args.value(flag)?)),
                "--overwrite" => self.overwrite = true,
                _ => return Ok(false),
            }
            Ok(true)
        }
    }

    fn run_height(args: &mut Args) -> Result<(), String> {
        let expression = args.value("<expression>")?;
        let mut space = String::from("cartesian");
        let mut options = HeightFieldOptions::default();
        let mut output = OutputOptions::default();

        while let Some(flag) = args.next() {
            if output.accept(&flag, args)? {
                continue;
            }
            match flag.as_str() {
                "--space" => space = args.value(&flag)?,
                "--resolution" => options.resolution = parse_usize(&flag, &args.value(&flag)?)?,
                "--color" => options.color_mode = parse_color_mode(&args.value(&flag)?)?,
                "--bounds" => {
                    let range = parse_range(&flag, args)?;
                    options.bounds = Some([range, range]);
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let mut engine = Engine::new();
        let surface = engine
            .build_height_field(&expression, &space, &options)
            .map_err(|e| e.to_string())?;
        let header = [
            format!("op height_field {space}"),
            format!("expression {expression}"),
            format!("resolution {}", options.resolution),
        ];
        finish("height_field", &surface, engine.last_diagnostics(), &header, &output)
    }

    fn run_implicit(args: &mut Args) -> Result<(), String> {
        let expression = args.value("<expression>")?;
        let mut options = IsosurfaceOptions::default();
        let mut output = OutputOptions::default();

        while let Some(flag) = args.next() {
            if output.accept(&flag, args)? {
                continue;
            }
            match flag.as_str() {
                "--resolution" => options.resolution = parse_usize(&flag, &args.value(&flag)?)?,
                "--iso" => options.isovalue = parse_f64(&flag, &args.value(&flag)?)?,
                "--bounds" => options.bounds = Some([parse_range(&flag, args)?; 3]),
                "--policy" => options.undefined_policy = parse_policy(&args.value(&flag)?)?,
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let mut engine = Engine::new();
        let surface = engine
            .build_isosurface(&expression, &options)
            .map_err(|e| e.to_string())?;
        let header = [
            "op isosurface".to_owned(),
            format!("expression {expression}"),
            format!("resolution {}", options.resolution),
            format!("isovalue {}", options.isovalue),
        ];
        finish("isosurface", &surface, engine.last_diagnostics(), &header, &output)
    }

    fn finish(
        name: &str,
        surface: &SurfaceData,
        diagnostics: Option<&FieldMeshDiagnostics>,
        header: &[String],
        output: &OutputOptions,
    ) -> Result<(), String> {
        if let Some(diagnostics) = diagnostics {
            print!("{diagnostics}");
            for warning in &diagnostics.warnings {
                eprintln!("warning: {warning}");
            }
        }

        if let Some(path) = &output.obj {
            write_obj_file(path, surface, name, output.overwrite)?;
            println!("wrote {}", path.display());
        }
        if let Some(path) = &output.snap {
            let text = snapshot(header, surface, diagnostics);
            write_text_file(path, &text, output.overwrite)?;
            println!("wrote {}", path.display());
        }
        Ok(())
    }

    fn parse_usize(flag: &str, raw: &str) -> Result<usize, String> {
        raw.parse()
            .map_err(|_| format!("invalid value for {flag}: `{raw}`"))
    }

    fn parse_f64(flag: &str, raw: &str) -> Result<f64, String> {
        let value: f64 = raw
            .parse()
            .map_err(|_| format!("invalid value for {flag}: `{raw}`"))?;
        if value.is_finite() {
            Ok(value)
        } else {
            Err(format!("{flag} must be finite"))
        }
    }

    fn parse_range(flag: &str, args: &mut Args) -> Result<AxisRange, String> {
        let min = parse_f64(flag, &args.value(flag)?)?;
        let max = parse_f64(flag, &args.value(flag)?)?;
        if min >= max {
            return Err(format!("{flag} expects min < max, got {min} {max}"));
        }
        Ok(AxisRange::new(min, max))
    }

    fn parse_color_mode(raw: &str) -> Result<ColorMode, String> {
        match raw.trim().to_lowercase().as_str() {
            "height" => Ok(ColorMode::Height),
            "domain" => Ok(ColorMode::Domain),
            "none" => Ok(ColorMode::None),
            other => Err(format!("unknown color mode `{other}`")),
        }
    }

    fn parse_policy(raw: &str) -> Result<UndefinedCornerPolicy, String> {
        match raw.trim().to_lowercase().as_str() {
            "outside" => Ok(UndefinedCornerPolicy::Outside),
            "skip" | "skip-cube" => Ok(UndefinedCornerPolicy::SkipCube),
            other => Err(format!("unknown undefined-corner policy `{other}`")),
        }
    }

    fn refuse_overwrite(path: &Path, overwrite: bool) -> Result<(), String> {
        if path.exists() && !overwrite {
            return Err(format!(
                "refusing to overwrite existing file {} (use --overwrite)",
                path.display()
            ));
        }
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| format!("create dir {}: {e}", parent.display()))?;
        }
        Ok(())
    }

    fn write_text_file(path: &Path, text: &str, overwrite: bool) -> Result<(), String> {
        refuse_overwrite(path, overwrite)?;
        fs::write(path, normalize_snapshot_text(text)).map_err(|e| format!("write {}: {e}", path.display()))
    }

    fn write_obj_file(path: &Path, surface: &SurfaceData, name: &str, overwrite: bool) -> Result<(), String> {
        surface
            .validate()
            .map_err(|e| format!("surface validation failed: {e}"))?;
        refuse_overwrite(path, overwrite)?;

        let file = File::create(path).map_err(|e| format!("create {}: {e}", path.display()))?;
        let mut w = BufWriter::new(file);

        writeln!(w, "o {name}").map_err(|e| format!("write obj: {e}"))?;
        for vertex in surface.vertices.chunks_exact(3) {
            writeln!(w, "v {} {} {}", vertex[0], vertex[1], vertex[2])
                .map_err(|e| format!("write obj: {e}"))?;
        }
        for normal in surface.normals.chunks_exact(3) {
            writeln!(w, "vn {} {} {}", normal[0], normal[1], normal[2])
                .map_err(|e| format!("write obj: {e}"))?;
        }
        for tri in surface.indices.chunks_exact(3) {
            let a = tri[0] + 1;
            let b = tri[1] + 1;
            let c = tri[2] + 1;
            writeln!(w, "f {a}//{a} {b}//{b} {c}//{c}").map_err(|e| format!("write obj: {e}"))?;
        }

        w.flush().map_err(|e| format!("flush {}: {e}", path.display()))
    }

    fn normalize_snapshot_text(text: &str) -> String {
        let normalized = text.replace("\r\n", "\n");
        if normalized.ends_with('\n') {
            normalized
        } else {
            format!("{normalized}\n")
        }
    }

    fn quantize_f64(value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let value = if value == -0.0 { 0.0 } else { value };
        let q = (value / SNAPSHOT_QUANTIZE).round() * SNAPSHOT_QUANTIZE;
        if q == -0.0 { 0.0 } else { q }
    }

    fn write_f64(out: &mut String, value: f64) {
        let q = quantize_f64(value);
        if q.is_nan() {
            out.push_str("NaN");
        } else if q.is_infinite() {
            out.push_str(if q.is_sign_positive() { "inf" } else { "-inf" });
        } else {
            let _ = write!(out, "{q:.SNAPSHOT_DECIMALS$}");
        }
    }

    fn write_triple_line(out: &mut String, tag: &str, values: &[f32]) {
        out.push_str(tag);
        for value in values {
            out.push(' ');
            write_f64(out, f64::from(*value));
        }
        out.push('\n');
    }

    fn write_field_diagnostics(out: &mut String, diag: &FieldMeshDiagnostics) {
        let _ = writeln!(out, "field_diag.sample_count {}", diag.sample_count);
        let _ = writeln!(
            out,
            "field_diag.undefined_sample_count {}",
            diag.undefined_sample_count
        );
        let _ = writeln!(
            out,
            "field_diag.placeholder_vertex_count {}",
            diag.placeholder_vertex_count
        );
        let _ = writeln!(out, "field_diag.active_cube_count {}", diag.active_cube_count);
        let _ = writeln!(
            out,
            "field_diag.indeterminate_cube_count {}",
            diag.indeterminate_cube_count
        );
        let _ = writeln!(out, "field_diag.open_edge_count {}", diag.open_edge_count);
        let _ = writeln!(
            out,
            "field_diag.non_manifold_edge_count {}",
            diag.non_manifold_edge_count
        );
        let _ = writeln!(out, "field_diag.warning_count {}", diag.warnings.len());
        for (idx, warning) in diag.warnings.iter().enumerate() {
            let _ = writeln!(out, "field_diag.warning.{idx} {warning}");
        }
    }

    fn snapshot(
        header: &[String],
        surface: &SurfaceData,
        diagnostics: Option<&FieldMeshDiagnostics>,
    ) -> String {
        let mut out = String::new();
        out.push_str("# field-engine golden v1\n");
        for line in header {
            out.push_str(line);
            out.push('\n');
        }
        let _ = writeln!(out, "quantize {SNAPSHOT_QUANTIZE:.1e}");
        let _ = writeln!(out, "vertex_count {}", surface.vertex_count());
        let _ = writeln!(out, "triangle_count {}", surface.triangle_count());
        let _ = writeln!(out, "has_colors {}", surface.colors.is_some());

        for vertex in surface.vertices.chunks_exact(3) {
            write_triple_line(&mut out, "v", vertex);
        }
        for normal in surface.normals.chunks_exact(3) {
            write_triple_line(&mut out, "n", normal);
        }
        if let Some(colors) = &surface.colors {
            for color in colors.chunks_exact(3) {
                write_triple_line(&mut out, "c", color);
            }
        }
        for tri in surface.indices.chunks_exact(3) {
            let _ = writeln!(out, "f {} {} {}", tri[0], tri[1], tri[2]);
        }

        if let Some(diagnostics) = diagnostics {
            write_field_diagnostics(&mut out, diagnostics);
        }
        out
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next()
                .ok_or_else(|| format!("missing value for {flag}"))
        }
    }
}
