//! The render request: accumulate options, build the Ghostscript command,
//! run it.
//!
//! ## Lifecycle
//!
//! ```text
//! RenderRequest::new()          discover gs (or with_tool)
//!  ├─ set_input_file / set_*    configure; input and device are validated here
//!  ├─ command / render_string   pure: build the invocation
//!  └─ render / try_render       spawn gs, wait, map the exit code
//! ```
//!
//! Configuration errors are returned immediately by the setter that caused
//! them. Render failures come back from [`RenderRequest::try_render`] as a
//! typed [`GsError`], or as `false` from [`RenderRequest::render`].

use crate::command::{Arg, RenderCommand, FIXED_FLAGS};
use crate::device::Device;
use crate::error::GsError;
use crate::options::{AntiAliasing, RenderOptions, Resolution};
use crate::pipeline::execute::{CommandExecutor, ExecOutput, SystemExecutor};
use crate::pipeline::input::{self, MagicSniffer, MimeSniffer};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// A single Ghostscript rasterisation: input file, options, and the
/// collaborators that validate and execute it.
///
/// # Example
/// ```rust,no_run
/// use gs_raster::{AntiAliasing, RenderRequest};
///
/// let mut gs = RenderRequest::new();
/// gs.set_device_by_name("jpeg")?
///     .set_input_file("path/to/file.pdf")?
///     .set_output_file("page-%03d")
///     .set_resolution(96, None)
///     .set_text_antialiasing(AntiAliasing::High);
/// if let Some(jpeg) = gs.device_mut().as_jpeg_mut() {
///     jpeg.set_quality(100);
/// }
///
/// if gs.render() {
///     println!("success");
/// }
/// # Ok::<(), gs_raster::GsError>(())
/// ```
#[derive(Clone)]
pub struct RenderRequest {
    input_file: Option<PathBuf>,
    options: RenderOptions,
    tool: Option<PathBuf>,
    sniffer: Arc<dyn MimeSniffer>,
    executor: Arc<dyn CommandExecutor>,
}

impl Default for RenderRequest {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RenderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderRequest")
            .field("input_file", &self.input_file)
            .field("options", &self.options)
            .field("tool", &self.tool)
            .field("sniffer", &"<dyn MimeSniffer>")
            .field("executor", &"<dyn CommandExecutor>")
            .finish()
    }
}

impl RenderRequest {
    /// Create a request with default options and a PNG device, locating
    /// Ghostscript through [`gs_locate::locate`].
    ///
    /// A failed lookup is not an error here: the request is still usable for
    /// building commands, and [`RenderRequest::try_render`] reports
    /// [`GsError::ToolMissing`].
    pub fn new() -> Self {
        let tool = match gs_locate::locate() {
            Ok(found) => found,
            Err(e) => {
                warn!("Ghostscript lookup failed: {}", e);
                None
            }
        };
        if tool.is_none() {
            debug!("No Ghostscript executable found on this host");
        }
        Self::with_tool_opt(tool)
    }

    /// Create a request that runs the Ghostscript executable at `path`,
    /// skipping discovery.
    pub fn with_tool(path: impl Into<PathBuf>) -> Self {
        Self::with_tool_opt(Some(path.into()))
    }

    fn with_tool_opt(tool: Option<PathBuf>) -> Self {
        Self {
            input_file: None,
            options: RenderOptions::default(),
            tool,
            sniffer: Arc::new(MagicSniffer),
            executor: Arc::new(SystemExecutor),
        }
    }

    /// Replace the MIME detection used by [`RenderRequest::set_input_file`].
    pub fn with_sniffer(mut self, sniffer: Arc<dyn MimeSniffer>) -> Self {
        self.sniffer = sniffer;
        self
    }

    /// Replace the process runner used by [`RenderRequest::render`].
    pub fn with_executor(mut self, executor: Arc<dyn CommandExecutor>) -> Self {
        self.executor = executor;
        self
    }

    /// Replace all options at once.
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    // ── Tool ─────────────────────────────────────────────────────────────

    pub fn tool(&self) -> Option<&Path> {
        self.tool.as_deref()
    }

    pub fn set_tool(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.tool = Some(path.into());
        self
    }

    // ── Input / output ───────────────────────────────────────────────────

    /// Set the file to rasterise, replacing any previous one.
    ///
    /// # Errors
    /// - [`GsError::UnsupportedInput`] if the sniffer detects a type other
    ///   than PDF, PostScript or EPS
    /// - [`GsError::InputUnreadable`] if the sniffer cannot read the file
    ///
    /// When the sniffer reports detection as unavailable the file is
    /// accepted unchecked.
    pub fn set_input_file(&mut self, path: impl AsRef<Path>) -> Result<&mut Self, GsError> {
        let path = path.as_ref();
        match self.sniffer.sniff(path) {
            Ok(Some(mime)) if !input::is_supported(&mime) => {
                return Err(GsError::UnsupportedInput {
                    path: path.to_path_buf(),
                    mime,
                });
            }
            Ok(Some(_)) => {}
            Ok(None) => debug!("MIME detection unavailable; accepting {} unchecked", path.display()),
            Err(source) => {
                return Err(GsError::InputUnreadable {
                    path: path.to_path_buf(),
                    source,
                });
            }
        }
        self.input_file = Some(path.to_path_buf());
        Ok(self)
    }

    pub fn input_file(&self) -> Option<&Path> {
        self.input_file.as_deref()
    }

    /// Set the output file name, without extension.
    ///
    /// The name is stored verbatim: page placeholders such as `%d` are left
    /// for Ghostscript, and nothing touches the file system.
    pub fn set_output_file(&mut self, name: impl Into<String>) -> &mut Self {
        self.options.output_file = name.into();
        self
    }

    /// The output name resolved against [`RenderRequest::base_path`], unless
    /// it is already absolute. Still without the device's file ending.
    pub fn output_file(&self) -> PathBuf {
        let name = Path::new(&self.options.output_file);
        if name.is_absolute() {
            name.to_path_buf()
        } else {
            self.base_path().join(name)
        }
    }

    /// Directory relative output names resolve against: the input file's
    /// directory, or the system temp directory when no input is set.
    pub fn base_path(&self) -> PathBuf {
        match &self.input_file {
            Some(file) => match file.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
                _ => PathBuf::from("."),
            },
            None => std::env::temp_dir(),
        }
    }

    // ── Options ──────────────────────────────────────────────────────────

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// `set_resolution(96, None)` renders at 96 dpi on both axes,
    /// `set_resolution(96, Some(150))` at 96 horizontally and 150 vertically.
    pub fn set_resolution(&mut self, horizontal: u32, vertical: Option<u32>) -> &mut Self {
        self.options.resolution = Resolution {
            horizontal,
            vertical,
        };
        self
    }

    pub fn resolution(&self) -> Resolution {
        self.options.resolution
    }

    /// Paper size name, passed to Ghostscript unchecked.
    pub fn set_papersize(&mut self, size: impl Into<String>) -> &mut Self {
        self.options.papersize = size.into();
        self
    }

    pub fn papersize(&self) -> &str {
        &self.options.papersize
    }

    /// Set text antialiasing. Levels other than 0, 1, 2 and 4 are ignored
    /// and the previous level is kept.
    pub fn set_text_antialiasing<L: TryInto<AntiAliasing>>(&mut self, level: L) -> &mut Self {
        match level.try_into() {
            Ok(l) => self.options.text_antialiasing = l,
            Err(_) => debug!("Ignoring invalid text antialiasing level"),
        }
        self
    }

    pub fn text_antialiasing(&self) -> AntiAliasing {
        self.options.text_antialiasing
    }

    /// Set graphics antialiasing. Levels other than 0, 1, 2 and 4 are
    /// ignored and the previous level is kept.
    pub fn set_graphics_antialiasing<L: TryInto<AntiAliasing>>(&mut self, level: L) -> &mut Self {
        match level.try_into() {
            Ok(l) => self.options.graphics_antialiasing = l,
            Err(_) => debug!("Ignoring invalid graphics antialiasing level"),
        }
        self
    }

    pub fn graphics_antialiasing(&self) -> AntiAliasing {
        self.options.graphics_antialiasing
    }

    /// Record whether the CIE colour map should be used. Stored only; the
    /// command line is the same either way.
    pub fn set_use_cie(&mut self, use_cie: bool) -> &mut Self {
        self.options.use_cie = use_cie;
        self
    }

    pub fn use_cie(&self) -> bool {
        self.options.use_cie
    }

    // ── Device ───────────────────────────────────────────────────────────

    /// Replace the output device.
    pub fn set_device(&mut self, device: impl Into<Device>) -> &mut Self {
        self.options.device = device.into();
        self
    }

    /// Replace the output device with a default-constructed one looked up by
    /// case-insensitive name.
    ///
    /// # Errors
    /// [`GsError::UnknownDevice`]; the current device is kept.
    pub fn set_device_by_name(&mut self, name: &str) -> Result<&mut Self, GsError> {
        self.options.device = Device::from_name(name)?;
        Ok(self)
    }

    pub fn device(&self) -> &Device {
        &self.options.device
    }

    pub fn device_mut(&mut self) -> &mut Device {
        &mut self.options.device
    }

    // ── Command assembly ─────────────────────────────────────────────────

    /// Build the Ghostscript invocation, or `None` when no input file is set.
    ///
    /// Token order is fixed: fixed flags, paper size, output file, device
    /// parameters, resolution, text then graphics alpha bits (only when set),
    /// input file. The CIE setting is stored but never adds a flag.
    pub fn command(&self) -> Option<RenderCommand> {
        let input_file = self.input_file.as_ref()?;
        let o = &self.options;

        let mut cmd = RenderCommand::new(self.tool.clone());
        for flag in FIXED_FLAGS {
            cmd.push(Arg::plain(*flag));
        }
        cmd.push(Arg::plain(format!("-sPaperSize={}", o.papersize)));

        // Append rather than set_extension: the name may contain dots or a
        // page placeholder.
        let mut out = self.output_file().into_os_string();
        out.push(".");
        out.push(o.device.file_ending());
        cmd.push(Arg::path("-sOutputFile=", out));

        for param in o.device.parameters() {
            cmd.push(Arg::plain(param));
        }
        cmd.push(Arg::plain(format!("-r{}", o.resolution)));
        if o.text_antialiasing.is_set() {
            cmd.push(Arg::plain(format!("-dTextAlphaBits={}", o.text_antialiasing)));
        }
        if o.graphics_antialiasing.is_set() {
            cmd.push(Arg::plain(format!(
                "-dGraphicsAlphaBits={}",
                o.graphics_antialiasing
            )));
        }
        cmd.push(Arg::path("", input_file.clone()));
        Some(cmd)
    }

    /// The command line as a single string, or `""` when no input file is
    /// set.
    pub fn render_string(&self) -> String {
        self.command().map(|c| c.to_string()).unwrap_or_default()
    }

    // ── Rendering ────────────────────────────────────────────────────────

    /// Run Ghostscript and wait for it.
    ///
    /// # Errors
    /// - [`GsError::NoInputFile`]: nothing to render
    /// - [`GsError::ToolMissing`]: no executable configured or found
    /// - [`GsError::Spawn`]: the process could not be started
    /// - [`GsError::SubprocessFailed`]: exit code other than 0
    pub fn try_render(&self) -> Result<ExecOutput, GsError> {
        let command = self.command().ok_or(GsError::NoInputFile)?;
        let program = self.tool.as_deref().ok_or(GsError::ToolMissing)?;

        info!(
            "Rendering {} → {}.{}",
            self.input_file()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
            self.output_file().display(),
            self.options.device.file_ending()
        );
        let start = Instant::now();

        let output = self
            .executor
            .execute(program, &command)
            .map_err(|source| GsError::Spawn {
                program: program.to_path_buf(),
                source,
            })?;

        if !output.success() {
            return Err(GsError::SubprocessFailed {
                code: output.exit_code,
                stderr: output.stderr,
            });
        }

        info!("Ghostscript finished in {}ms", start.elapsed().as_millis());
        Ok(output)
    }

    /// Run Ghostscript and report only whether it succeeded.
    ///
    /// Returns `false` for every failure [`RenderRequest::try_render`] can
    /// report, including "no input file"; the reason is logged at `warn`.
    pub fn render(&self) -> bool {
        match self.try_render() {
            Ok(_) => true,
            Err(e) => {
                warn!("Render failed: {}", e);
                false
            }
        }
    }

    /// [`RenderRequest::try_render`] on tokio's blocking pool, for callers
    /// already inside an async runtime.
    pub async fn render_async(&self) -> Result<ExecOutput, GsError> {
        let request = self.clone();
        tokio::task::spawn_blocking(move || request.try_render())
            .await
            .map_err(|e| GsError::Internal(format!("Render task panicked: {}", e)))?
    }
}
