//! User Commands
//!
//! User actions translated from keybindings. `AppState::handle_command`
//! interprets them against whatever screen, panel or modal is active.

use super::state::Panel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // ========== Application Control ==========
    Quit,
    ToggleHelp,
    Logout,

    // ========== Navigation ==========
    NextPanel,
    PrevPanel,
    ShowPanel(Panel),
    /// Re-fetch the active panel
    Reload,
    /// Switch focus between the lists of a panel
    FocusLeft,
    FocusRight,

    // ========== Lists ==========
    CursorUp,
    CursorDown,

    // ========== Panel Actions ==========
    /// Create an item in the active panel
    NewItem,
    /// Edit the highlighted item
    EditItem,
    /// Rename the highlighted account
    RenameItem,
    /// Delete the highlighted account
    DeleteItem,
    /// Edit the highlighted account's model allow-list
    EditModels,
    OpenPmSettings,
    /// Open the folder browser for the highlighted project or workspace
    BrowseWorkspace,
    ConnectGithub,
    ConnectCoder,
    CoderOAuth,

    // ========== Text Input ==========
    InsertChar(char),
    DeleteCharBefore,
    ClearInput,
    NextField,
    PrevField,
    /// Enter: submit form, send chat message, open folder, confirm
    Submit,
    /// Switch between sign-in and registration
    ToggleAuthMode,

    // ========== Modal Interaction ==========
    CloseModal,
    /// Space in checklists
    ToggleItem,
    /// Select every model / clear the allow-list
    ToggleAll,
    /// Mark the highlighted model as the default
    SetDefault,
    /// Probe the provider's models from the new account form
    FetchProviderModels,
    /// Folder browser: go to the parent directory
    BrowseParent,
    /// Folder browser: save the current path into the project
    SaveSelection,
}
