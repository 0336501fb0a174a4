use std::{
    env, fs,
    path::{Path, PathBuf},
    time::UNIX_EPOCH,
};

use crate::{
    error::RuntimeError,
    interpreter::{evaluator::core::EvalResult, value::core::Value},
    util::num::usize_to_int,
};

fn io_error(path: &Path, err: &std::io::Error, line: usize) -> RuntimeError {
    RuntimeError::io(format!("{}: {err}", path.display()), line)
}

fn path_arg(value: &Value, line: usize) -> EvalResult<PathBuf> {
    value.as_str(line).map(PathBuf::from)
}

fn path_value(path: &Path) -> Value {
    Value::from(path.to_string_lossy().into_owned())
}

/// `GetCurrentDirectory()`.
pub fn current_directory(_args: &[Value], line: usize) -> EvalResult<Value> {
    env::current_dir().map(|dir| path_value(&dir))
                      .map_err(|err| io_error(Path::new("."), &err, line))
}

/// `ListDirectory([path])`: entry names of a directory, sorted.
///
/// Lists the working directory when no path is given.
///
/// # Errors
/// `IOError` when the directory cannot be read.
pub fn list_directory(args: &[Value], line: usize) -> EvalResult<Value> {
    let dir = match args.first() {
        Some(path) => path_arg(path, line)?,
        None => PathBuf::from("."),
    };
    let entries = fs::read_dir(&dir).map_err(|err| io_error(&dir, &err, line))?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| io_error(&dir, &err, line))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(Value::from(names.into_iter().map(Value::from).collect::<Vec<_>>()))
}

/// Applies a path predicate such as `Path::exists` to one argument.
pub fn test_path(args: &[Value], line: usize, test: fn(&Path) -> bool) -> EvalResult<Value> {
    Ok(Value::Bool(test(&path_arg(&args[0], line)?)))
}

/// `GetFileSize(path)`: size in bytes.
pub fn file_size(args: &[Value], line: usize) -> EvalResult<Value> {
    let path = path_arg(&args[0], line)?;
    let meta = fs::metadata(&path).map_err(|err| io_error(&path, &err, line))?;
    let size = usize::try_from(meta.len()).map_err(|_| RuntimeError::io("file too large", line))?;
    Ok(Value::Integer(usize_to_int(size)))
}

/// `JoinPath(a, b, ...)`.
///
/// # Example
/// ```
/// use fight::interpreter::{evaluator::function::file::join_path, value::core::Value};
///
/// let joined = join_path(&[Value::from("lib"), Value::from("util.fight")], 1).unwrap();
/// assert_eq!(joined, Value::from(format!("lib{}util.fight", std::path::MAIN_SEPARATOR)));
/// ```
pub fn join_path(args: &[Value], line: usize) -> EvalResult<Value> {
    let mut path = PathBuf::new();
    for part in args {
        path.push(part.as_str(line)?);
    }
    Ok(path_value(&path))
}

/// `GetAbsolutePath(path)`: the path joined onto the working directory.
///
/// The path does not need to exist.
pub fn absolute_path(args: &[Value], line: usize) -> EvalResult<Value> {
    let path = path_arg(&args[0], line)?;
    std::path::absolute(&path).map(|abs| path_value(&abs))
                              .map_err(|err| io_error(&path, &err, line))
}

/// `GetFileExtension(path)`: the extension with its leading dot, or `""`.
pub fn extension(args: &[Value], line: usize) -> EvalResult<Value> {
    let path = path_arg(&args[0], line)?;
    Ok(Value::from(path.extension()
                       .map(|ext| format!(".{}", ext.to_string_lossy()))
                       .unwrap_or_default()))
}

/// `GetEnvironmentVariable(name)`: the value, or `void` when unset.
pub fn env_var(args: &[Value], line: usize) -> EvalResult<Value> {
    Ok(env::var(args[0].as_str(line)?).map_or(Value::Void, Value::from))
}

/// Runs a filesystem action on one path argument, mapping failures to
/// `IOError`.
fn on_path(args: &[Value], line: usize, action: fn(&Path) -> std::io::Result<()>) -> EvalResult<Value> {
    let path = path_arg(&args[0], line)?;
    action(&path).map_err(|err| io_error(&path, &err, line))?;
    Ok(Value::Void)
}

/// Runs a filesystem action on a source and destination argument.
fn on_paths(args: &[Value], line: usize, action: fn(&Path, &Path) -> std::io::Result<()>) -> EvalResult<Value> {
    let (from, to) = (path_arg(&args[0], line)?, path_arg(&args[1], line)?);
    action(&from, &to).map_err(|err| io_error(&from, &err, line))?;
    Ok(Value::Void)
}

/// `ChangeDirectory(path)`.
pub fn change_directory(args: &[Value], line: usize) -> EvalResult<Value> {
    on_path(args, line, |p| env::set_current_dir(p))
}

/// `CreateDirectory(path)`: the parent must exist.
pub fn create_directory(args: &[Value], line: usize) -> EvalResult<Value> {
    on_path(args, line, |p| fs::create_dir(p))
}

/// `CreateDirectories(path)`: creates missing parents too.
pub fn create_directories(args: &[Value], line: usize) -> EvalResult<Value> {
    on_path(args, line, |p| fs::create_dir_all(p))
}

/// `RemoveFile(path)`.
pub fn remove_file(args: &[Value], line: usize) -> EvalResult<Value> {
    on_path(args, line, |p| fs::remove_file(p))
}

/// `RemoveDirectory(path)`: the directory must be empty.
pub fn remove_directory(args: &[Value], line: usize) -> EvalResult<Value> {
    on_path(args, line, |p| fs::remove_dir(p))
}

/// `RemoveDirectoryTree(path)`.
pub fn remove_directory_tree(args: &[Value], line: usize) -> EvalResult<Value> {
    on_path(args, line, |p| fs::remove_dir_all(p))
}

/// `RenameFile(from, to)`.
pub fn rename(args: &[Value], line: usize) -> EvalResult<Value> {
    on_paths(args, line, |from, to| fs::rename(from, to))
}

/// Resolves a copy or move target: a directory destination receives the
/// source under its own file name.
fn target_for(from: &Path, to: &Path) -> PathBuf {
    match from.file_name() {
        Some(name) if to.is_dir() => to.join(name),
        _ => to.to_path_buf(),
    }
}

/// `CopyFile(from, to)`.
pub fn copy_file(args: &[Value], line: usize) -> EvalResult<Value> {
    on_paths(args, line, |from, to| fs::copy(from, target_for(from, to)).map(|_| ()))
}

/// `MoveFile(from, to)`. Falls back to copy and delete when a rename
/// cannot cross filesystems.
pub fn move_file(args: &[Value], line: usize) -> EvalResult<Value> {
    on_paths(args, line, |from, to| {
        let to = target_for(from, to);
        fs::rename(from, &to).or_else(|_| {
                                 fs::copy(from, &to)?;
                                 fs::remove_file(from)
                             })
    })
}

/// `SplitPath(path)`: `[head, tail]`, where `tail` is the last component.
///
/// # Example
/// ```
/// use fight::interpreter::{evaluator::function::file::split_path, value::core::Value};
///
/// let parts = split_path(&[Value::from("lib/util.fight")], 1).unwrap();
/// assert_eq!(parts.to_string(), "[\"lib\", \"util.fight\"]");
/// ```
pub fn split_path(args: &[Value], line: usize) -> EvalResult<Value> {
    let path = path_arg(&args[0], line)?;
    let head = path.parent().map(path_value).unwrap_or_else(|| Value::from(""));
    let tail = path.file_name()
                   .map(|name| Value::from(name.to_string_lossy().into_owned()))
                   .unwrap_or_else(|| Value::from(""));
    Ok(Value::from(vec![head, tail]))
}

/// `GetFileModificationTime(path)`: seconds since the Unix epoch.
pub fn modification_time(args: &[Value], line: usize) -> EvalResult<Value> {
    let path = path_arg(&args[0], line)?;
    let modified = fs::metadata(&path).and_then(|meta| meta.modified())
                                      .map_err(|err| io_error(&path, &err, line))?;
    let since = modified.duration_since(UNIX_EPOCH)
                        .map_err(|err| RuntimeError::io(format!("{}: {err}", path.display()), line))?;
    Ok(Value::Float(since.as_secs_f64()))
}

/// `SetEnvironmentVariable(name, value)`.
///
/// # Errors
/// `ValueError` for an empty name or one containing `=` or NUL.
pub fn set_env_var(args: &[Value], line: usize) -> EvalResult<Value> {
    let (name, value) = (args[0].as_str(line)?, args[1].as_str(line)?);
    if name.is_empty() || name.contains(['=', '\0']) || value.contains('\0') {
        return Err(RuntimeError::value(format!("invalid environment variable '{name}'"), line));
    }
    // SAFETY: the interpreter runs scripts on one thread and no other thread
    // reads the environment while a builtin executes.
    unsafe { env::set_var(name, value) };
    Ok(Value::Void)
}

/// `GetSystemName()`: `"posix"` on Unix-like systems, `"nt"` on Windows.
pub fn system_name(_args: &[Value], _line: usize) -> EvalResult<Value> {
    Ok(Value::from(if cfg!(windows) { "nt" } else { "posix" }))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn directory_listing_is_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "bb").unwrap();
        fs::write(dir.path().join("a.fight"), "").unwrap();
        let root = path_value(dir.path());

        let listing = list_directory(std::slice::from_ref(&root), 1).unwrap();
        assert_eq!(listing.to_string(), "[\"a.fight\", \"b.txt\"]");

        let file = join_path(&[root, Value::from("b.txt")], 1).unwrap();
        assert_eq!(file_size(std::slice::from_ref(&file), 1).unwrap(), Value::Integer(2));
        assert_eq!(test_path(std::slice::from_ref(&file), 1, Path::is_file).unwrap(),
                   Value::Bool(true));
        assert_eq!(extension(&[file], 1).unwrap(), Value::from(".txt"));
    }

    #[test]
    fn missing_paths_raise_io_errors() {
        let err = file_size(&[Value::from("/definitely/not/here")], 1).unwrap_err();
        assert_eq!(err.kind_name(), "IOError");
        assert_eq!(extension(&[Value::from("Makefile")], 1).unwrap(), Value::from(""));
    }

    #[test]
    fn files_can_be_created_moved_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let root = path_value(dir.path());
        let join = |parts: &[&str]| {
            let mut args = vec![root.clone()];
            args.extend(parts.iter().map(|p| Value::from(*p)));
            join_path(&args, 1).unwrap()
        };

        create_directories(&[join(&["a", "b"])], 1).unwrap();
        assert_eq!(create_directory(&[join(&["x", "y"])], 1).unwrap_err().kind_name(), "IOError");

        fs::write(dir.path().join("note.txt"), "hi").unwrap();
        copy_file(&[join(&["note.txt"]), join(&["a"])], 1).unwrap();
        assert!(dir.path().join("a").join("note.txt").is_file());

        rename(&[join(&["note.txt"]), join(&["renamed.txt"])], 1).unwrap();
        move_file(&[join(&["renamed.txt"]), join(&["a", "b"])], 1).unwrap();
        assert!(!dir.path().join("renamed.txt").exists());
        assert!(dir.path().join("a").join("b").join("renamed.txt").is_file());

        assert!(matches!(modification_time(&[join(&["a", "note.txt"])], 1).unwrap(), Value::Float(t) if t > 0.0));

        remove_file(&[join(&["a", "note.txt"])], 1).unwrap();
        assert_eq!(remove_directory(&[join(&["a"])], 1).unwrap_err().kind_name(), "IOError");
        remove_directory_tree(&[join(&["a"])], 1).unwrap();
        assert!(!dir.path().join("a").exists());
    }

    #[test]
    fn paths_split_into_head_and_tail() {
        assert_eq!(split_path(&[Value::from("note.txt")], 1).unwrap().to_string(),
                   "[\"\", \"note.txt\"]");
        assert_eq!(change_directory(&[Value::from("/definitely/not/here")], 1).unwrap_err().kind_name(),
                   "IOError");
    }

    #[test]
    fn environment_variables_round_trip() {
        let name = "FIGHT_TEST_SET_ENV_VAR";
        set_env_var(&[Value::from(name), Value::from("on")], 1).unwrap();
        assert_eq!(env_var(&[Value::from(name)], 1).unwrap(), Value::from("on"));
        assert_eq!(set_env_var(&[Value::from("A=B"), Value::from("x")], 1).unwrap_err().kind_name(),
                   "ValueError");
        assert!(matches!(system_name(&[], 1).unwrap(), Value::Str(s) if s == "posix" || s == "nt"));
    }
}
