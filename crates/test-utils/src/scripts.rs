#![allow(dead_code)]

//! Shell scripts standing in for the build tool and the built program.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Write an executable `/bin/sh` script with the given body.
pub fn write_script(path: &Path, body: &str) -> Result<()> {
    let contents = format!("#!/bin/sh\n{body}\n");
    fs::write(path, contents).with_context(|| format!("writing script {:?}", path))?;
    fs::set_permissions(path, fs::Permissions::from_mode(0o755))
        .with_context(|| format!("chmod script {:?}", path))?;
    Ok(())
}

/// A fake `<tool> build -o <out> ...` that records every invocation.
///
/// Each invocation appends `start <pid> <args>` and `end <pid> ok|fail` to
/// `build.log`. On success it writes an executable program to `<out>` that
/// appends `<pid> <APP_ENV> <args>` to `run.log` and then sleeps.
///
/// Behaviour switches, all files next to the tool:
/// - `fail`: exit with status 2 instead of producing the program
/// - `build_sleep`: seconds to sleep before finishing
pub struct FakeBuildTool {
    dir: PathBuf,
    path: PathBuf,
}

impl FakeBuildTool {
    pub fn install(dir: &Path) -> Result<Self> {
        let path = dir.join("fake-go");
        let body = format!(
            r#"dir='{dir}'
echo "start $$ $*" >> "$dir/build.log"
if [ -f "$dir/build_sleep" ]; then sleep "$(cat "$dir/build_sleep")"; fi
if [ -f "$dir/fail" ]; then
  echo "end $$ fail" >> "$dir/build.log"
  exit 2
fi
out="$3"
cat > "$out" <<PROG
#!/bin/sh
echo "\$\$ \$APP_ENV \$*" >> "$dir/run.log"
exec sleep 30
PROG
chmod +x "$out"
echo "end $$ ok" >> "$dir/build.log""#,
            dir = dir.display()
        );
        write_script(&path, &body)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tool path as a config string.
    pub fn tool(&self) -> String {
        self.path.display().to_string()
    }

    pub fn set_failing(&self, failing: bool) -> Result<()> {
        let flag = self.dir.join("fail");
        if failing {
            fs::write(&flag, "")?;
        } else if flag.exists() {
            fs::remove_file(&flag)?;
        }
        Ok(())
    }

    /// Make every build take `secs` seconds (e.g. `"0.3"`).
    pub fn set_build_time(&self, secs: &str) -> Result<()> {
        fs::write(self.dir.join("build_sleep"), secs)?;
        Ok(())
    }

    pub fn build_log(&self) -> Vec<String> {
        read_lines(&self.dir.join("build.log"))
    }

    /// Number of builds that have started.
    pub fn starts(&self) -> usize {
        self.build_log()
            .iter()
            .filter(|l| l.starts_with("start "))
            .count()
    }

    /// Number of builds that have finished, successfully or not.
    pub fn ends(&self) -> usize {
        self.build_log()
            .iter()
            .filter(|l| l.starts_with("end "))
            .count()
    }

    pub fn run_log(&self) -> Vec<String> {
        read_lines(&self.dir.join("run.log"))
    }
}

fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .map(|s| s.lines().map(str::to_string).collect())
        .unwrap_or_default()
}
