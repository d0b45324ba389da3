#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use gowatch::config::Config;

/// Builder for a resolved `Config` to simplify test setup.
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn app_name(mut self, name: &str) -> Self {
        self.config.app_name = name.to_string();
        self
    }

    pub fn output(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output = dir.into();
        self
    }

    pub fn ext(mut self, ext: &str) -> Self {
        self.config.watch.ext = vec![ext.to_string()];
        self
    }

    pub fn watch_path(mut self, path: &str) -> Self {
        self.config.watch.paths.push(path.to_string());
        self
    }

    pub fn vendor(mut self, val: bool) -> Self {
        self.config.watch.vendor = val;
        self
    }

    pub fn exclude(mut self, path: &str) -> Self {
        self.config.watch.exclude.push(path.to_string());
        self
    }

    pub fn build_tool(mut self, tool: impl Into<String>) -> Self {
        self.config.build.tool = tool.into();
        self
    }

    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.config.build.delay = Duration::from_millis(ms);
        self
    }

    pub fn build_arg(mut self, arg: &str) -> Self {
        self.config.build.args.push(arg.to_string());
        self
    }

    pub fn pkg(mut self, pkg: &str) -> Self {
        self.config.build.pkg = pkg.to_string();
        self
    }

    pub fn tags(mut self, tags: &str) -> Self {
        self.config.build.tags = tags.to_string();
        self
    }

    pub fn auto_run(mut self, val: bool) -> Self {
        self.config.run.auto_run = val;
        self
    }

    pub fn run_arg(mut self, arg: &str) -> Self {
        self.config.run.args.push(arg.to_string());
        self
    }

    pub fn env(mut self, entry: &str) -> Self {
        self.config.run.envs.push(entry.to_string());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
