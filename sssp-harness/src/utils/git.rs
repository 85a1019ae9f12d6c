/// Commit hash of the current directory, with a `-dirty` suffix for a modified
/// worktree. `unknown` outside a git repository.
pub fn get_git_hash() -> String {
    let git_info = git_info2::get();
    let Some(mut hash) = git_info.head.last_commit_hash else {
        return "unknown".to_owned();
    };
    if git_info.dirty.unwrap_or_default() {
        hash += "-dirty";
    }
    hash
}
