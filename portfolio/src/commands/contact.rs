use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use anyhow::{bail, Context};
use clap::Subcommand;
use portfolio_client::{
    api::{ContactApiService, ContactApiServiceImpl},
    form::{ContactForm, ContactFormError, FormState},
};
use portfolio_config::Config;
use portfolio_models::schema::ContactField;
use url::Url;

#[derive(Debug, Subcommand)]
pub enum ContactCommand {
    /// Submit the contact form of a running server
    #[command(aliases(["s"]))]
    Send {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        message: String,
        /// Base url of the server [default: derived from the http config]
        #[arg(long, env = "PORTFOLIO_URL")]
        url: Option<Url>,
    },
    /// List all contacts stored by a running server
    #[command(aliases(["ls", "l"]))]
    List {
        /// Base url of the server [default: derived from the http config]
        #[arg(long, env = "PORTFOLIO_URL")]
        url: Option<Url>,
    },
}

impl ContactCommand {
    pub async fn invoke(self, config: Config) -> anyhow::Result<()> {
        match self {
            ContactCommand::Send {
                name,
                email,
                subject,
                message,
                url,
            } => {
                let fields = [
                    (ContactField::Name, name),
                    (ContactField::Email, email),
                    (ContactField::Subject, subject),
                    (ContactField::Message, message),
                ];
                send(&config, url, fields).await
            }
            ContactCommand::List { url } => list(&config, url).await,
        }
    }
}

async fn send(
    config: &Config,
    url: Option<Url>,
    fields: [(ContactField, String); 4],
) -> anyhow::Result<()> {
    let api = api(config, url)?;
    let form = ContactForm::new(api, &config.contact.owner_name);

    for (field, value) in fields {
        for message in form.set_field(field, value) {
            eprintln!("{field}: {message}");
        }
    }

    match form.submit().await {
        Ok(FormState::Succeeded(feedback)) => {
            println!("{}\n{}", feedback.title, feedback.description);
            Ok(())
        }
        Ok(FormState::Failed(feedback)) => bail!("{}: {}", feedback.title, feedback.description),
        Ok(state) => bail!("Unexpected form state {state:?}"),
        Err(ContactFormError::Invalid(_)) => bail!("The contact form is invalid"),
        Err(err) => Err(err.into()),
    }
}

async fn list(config: &Config, url: Option<Url>) -> anyhow::Result<()> {
    let contacts = api(config, url)?
        .list_contacts()
        .await
        .context("Failed to fetch contacts")?;

    for contact in contacts {
        println!(
            "#{} {} {} <{}>: {}",
            contact.id,
            contact.created_at.to_rfc3339(),
            contact.name,
            contact.email,
            contact.subject
        );
    }

    Ok(())
}

fn api(config: &Config, url: Option<Url>) -> anyhow::Result<ContactApiServiceImpl> {
    let url = match url {
        Some(url) => url,
        None => local_url(config.http.host, config.http.port)?,
    };
    ContactApiServiceImpl::new(url)
}

fn local_url(host: IpAddr, port: u16) -> anyhow::Result<Url> {
    let host = match host {
        IpAddr::V4(ip) if ip.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(ip) if ip.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    let host = match host {
        IpAddr::V4(ip) => ip.to_string(),
        IpAddr::V6(ip) => format!("[{ip}]"),
    };
    format!("http://{host}:{port}/")
        .parse()
        .context("Failed to build server url")
}
