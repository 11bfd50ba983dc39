// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use fsmon_sdk::{Instance, InstanceId, MonitorClient};

#[derive(Subcommand)]
pub enum InstanceCommand {
    /// List registered instances (oldest first)
    List {
        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one instance
    Get {
        #[arg(value_name = "INSTANCE_ID")]
        instance_id: String,

        /// Print raw JSON
        #[arg(long)]
        json: bool,
    },

    /// Mark an instance terminated
    Terminate {
        #[arg(value_name = "INSTANCE_ID")]
        instance_id: String,
    },
}

pub async fn handle_command(command: InstanceCommand, url: &str) -> Result<()> {
    let client = MonitorClient::new(url);

    match command {
        InstanceCommand::List { json } => list(&client, json).await,
        InstanceCommand::Get { instance_id, json } => get(&client, instance_id.into(), json).await,
        InstanceCommand::Terminate { instance_id } => terminate(&client, instance_id.into()).await,
    }
}

async fn list(client: &MonitorClient, json: bool) -> Result<()> {
    let instances = client.list_instances().await.context("Failed to list instances")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&instances)?);
        return Ok(());
    }

    if instances.is_empty() {
        println!("{}", "No instances registered".yellow());
        return Ok(());
    }

    println!("{} instances registered:", instances.len());
    println!(
        "{:<38} {:<20} {:<16} {:<20} {:<25} {}",
        "ID", "HOSTNAME", "CLIENT IP", "USER", "CREATED", "STATE"
    );

    for instance in &instances {
        let state = state_label(instance);
        println!(
            "{:<38} {:<20} {:<16} {:<20} {:<25} {}",
            instance.instance_id,
            instance.client_hostname.bold(),
            instance.client_host_ip,
            instance.config.client_user,
            instance.creation_time.format("%Y-%m-%d %H:%M:%S UTC"),
            if instance.terminated { state.dimmed() } else { state.green() }
        );
    }

    Ok(())
}

async fn get(client: &MonitorClient, instance_id: InstanceId, json: bool) -> Result<()> {
    let instance = client
        .get_instance(&instance_id)
        .await
        .with_context(|| format!("Failed to fetch instance {}", instance_id))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&instance)?);
        return Ok(());
    }

    println!("{}", format!("Instance {}", instance.instance_id).bold());
    println!("  state:          {}", state_label(&instance));
    println!("  hostname:       {}", instance.client_hostname);
    println!("  client ip:      {}", instance.client_host_ip);
    println!("  server:         {}:{} ({})", instance.config.host, instance.config.port, instance.config.zone);
    println!("  user:           {}", instance.config.client_user);
    println!("  auth scheme:    {}", instance.config.auth_scheme);
    println!("  created:        {}", instance.creation_time);
    if let Some(at) = instance.last_activity_time {
        println!("  last activity:  {}", at);
    }
    if let Some(at) = instance.termination_time {
        println!("  terminated at:  {}", at);
    }

    Ok(())
}

async fn terminate(client: &MonitorClient, instance_id: InstanceId) -> Result<()> {
    client
        .terminate_instance(&instance_id)
        .await
        .with_context(|| format!("Failed to terminate instance {}", instance_id))?;
    println!("{}", format!("✓ Instance {} terminated", instance_id).green());
    Ok(())
}

pub fn state_label(instance: &Instance) -> &'static str {
    if instance.terminated {
        "terminated"
    } else {
        "active"
    }
}
