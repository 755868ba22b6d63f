//! User management commands.

use listenink::Library;

use crate::backend::create_backend;
use crate::cli::{UserAddArgs, UserListArgs};
use crate::output::{OutputFormat, print_table};

/// Run the `user add` command
pub async fn add(args: &UserAddArgs) -> Result<(), Box<dyn std::error::Error>> {
    let library = Library::new(create_backend(&args.backend_config).await?);
    let user = library.create_user(&args.name, &args.email).await?;

    match args.format {
        OutputFormat::Human => println!("Created user {} ({})", user.name, user.id),
        OutputFormat::Json => println!("{}", serde_json::to_string(&user)?),
    }

    library.backend().close().await;
    Ok(())
}

/// Run the `user list` command
pub async fn list(args: &UserListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let library = Library::new(create_backend(&args.backend_config).await?);
    let users = library.list_users().await?;

    match args.format {
        OutputFormat::Human => {
            if users.is_empty() {
                println!("No users found.");
            } else {
                let rows: Vec<Vec<String>> = users
                    .iter()
                    .map(|u| vec![u.id.to_string(), u.name.clone(), u.email.clone()])
                    .collect();
                print_table(&["ID", "NAME", "EMAIL"], &rows);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string(&users)?),
    }

    library.backend().close().await;
    Ok(())
}
