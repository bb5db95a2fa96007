//! Report fixtures written into scratch workspaces.

use std::path::{Path, PathBuf};

pub const TRX_NAMESPACE: &str = "http://microsoft.com/schemas/VisualStudio/TeamTest/2010";

/// A TRX document with the given counters.
pub fn trx(total: u64, executed: u64, passed: u64, failed: u64) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<TestRun id="5c1b" name="ci@agent" xmlns="{TRX_NAMESPACE}">
  <Times creation="2024-05-02T08:00:00.0000000+00:00" start="2024-05-02T08:00:01.0000000+00:00" finish="2024-05-02T08:00:11.0000000+00:00" />
  <ResultSummary outcome="Completed">
    <Counters total="{total}" executed="{executed}" passed="{passed}" failed="{failed}" error="0" timeout="0" aborted="0" inconclusive="0" />
  </ResultSummary>
</TestRun>"#
    )
}

/// A Newman HTML report whose summary reads "N passed, N failed, N total".
pub fn newman_html(passed: u64, failed: u64) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><head><title>Newman Report</title></head>
<body>
  <h1>WeSign API</h1>
  <div class="summary">{passed} passed, {failed} failed, {total} total</div>
  <table>
    <tr><td>POST /v3/users/login</td><td>140ms</td></tr>
    <tr><td>GET /v3/documents</td><td>60ms</td></tr>
  </table>
</body></html>"#,
        total = passed + failed
    )
}

/// Write `content` at `relative` under `root`, creating directories.
pub fn write(root: &Path, relative: &str, content: impl AsRef<[u8]>) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
}
