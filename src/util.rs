use rand::Rng;

mod one_shot_file;

pub use one_shot_file::OneShotFile;

const SIZE_UNITS: [&str; 5] = ["bytes", "KB", "MB", "GB", "TB"];

// 1024-based units, e.g. `15.23 MB`. Anything bigger stays in TB.
pub fn human_size(bytes: u64) -> String {
  let mut size = bytes as f64;
  let mut unit = SIZE_UNITS[0];

  for next in SIZE_UNITS[1..].iter().copied() {
    if size < 1024.0 {
      break;
    }
    size /= 1024.0;
    unit = next;
  }

  format!("{size:.2} {unit}")
}

pub fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first
      .to_uppercase()
      .chain(chars.flat_map(char::to_lowercase))
      .collect(),
    None => String::new(),
  }
}

pub fn unique_id() -> String {
  format!("{:032x}", rand::thread_rng().gen::<u128>())
}
