/// Router Module Index
///
/// Organizes the application's routing into access-segregated modules so the
/// authentication boundary is applied explicitly at the module level rather
/// than per-handler.

/// Routes accessible to any client, anonymous included: reads, the update
/// endpoint (ownership is deliberately not checked on update), registration
/// and login.
pub mod public;

/// Routes protected by the `AuthUser` extractor middleware: the two
/// ownership-sensitive blog mutations.
pub mod authenticated;
